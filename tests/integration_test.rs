//! Integration tests for famlib
//!
//! These tests build throwaway libraries on disk and drive the indexer,
//! thumbnail generator, loader and filter engine through the public API.

use famlib::catalog::{AssetPattern, CatalogItem, CatalogStore};
use famlib::config::Settings;
use famlib::filter::{DisplayMode, FilterEngine, TagPolicy, ToggleGroup};
use famlib::host::portable::{
    AssetManifest, DirectoryWorkspace, IdleFlag, ManifestDocument, PortableHost,
};
use famlib::host::{AssetHost, FileInfo, HostError};
use famlib::indexer::Indexer;
use famlib::loader::{ConflictChoice, LoadOutcome, LoadRequest, ScriptedResolver, load_selected};
use famlib::placement::DeferredPlacement;
use famlib::session::LibrarySession;
use famlib::tasks::{LibraryExecutor, TaskQueue, TaskRequest, TaskResult};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper function to write an asset manifest below `<root>/Families`
fn write_asset(root: &Path, relative: &str, category: &str) -> PathBuf {
    let path = root.join("Families").join(relative);
    AssetManifest::new(category)
        .saved_in("Autodesk Revit 2023")
        .with_variant("600 x 2100", 600, 2100)
        .with_variant("900 x 2100", 900, 2100)
        .write(&path)
        .unwrap();
    path
}

/// Helper function to build an item carrying the given tags
fn tagged_item(name: &str, tags: &[&str]) -> CatalogItem {
    let mut item = CatalogItem::new(Path::new(&format!("/lib/{name}.rfa")), format!("{name}.rfa"));
    for tag in tags {
        item.user_tags.insert(tag);
    }
    item
}

/// Portable host that counts document opens
#[derive(Default)]
struct CountingHost {
    inner: PortableHost,
    opened: Cell<usize>,
}

impl AssetHost for CountingHost {
    type Document = ManifestDocument;

    fn open_document(&self, path: &Path) -> Result<ManifestDocument, HostError> {
        self.opened.set(self.opened.get() + 1);
        self.inner.open_document(path)
    }

    fn file_info(&self, path: &Path) -> Result<FileInfo, HostError> {
        self.inner.file_info(path)
    }
}

#[test]
fn test_index_twice_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    write_asset(tmp.path(), "Doors/Door.rfa", "Doors");
    write_asset(tmp.path(), "Windows/Window.rfa", "Windows");

    let indexer = Indexer::new(&PortableHost);
    indexer.build_index(tmp.path()).unwrap();
    let store = CatalogStore::for_root(tmp.path());
    let first = fs::read(store.path()).unwrap();

    indexer.build_index(tmp.path()).unwrap();
    let second = fs::read(store.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reindex_skips_unchanged_files() {
    let tmp = TempDir::new().unwrap();
    write_asset(tmp.path(), "A.rfa", "Doors");
    write_asset(tmp.path(), "B.rfa", "Doors");

    let host = CountingHost::default();
    let indexer = Indexer::new(&host);
    let report = indexer.build_index(tmp.path()).unwrap();
    assert_eq!(report.updated, 2);
    assert_eq!(host.opened.get(), 2);
    let before = CatalogStore::for_root(tmp.path()).load();

    let report = indexer.build_index(tmp.path()).unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(host.opened.get(), 2);
    assert_eq!(CatalogStore::for_root(tmp.path()).load(), before);
}

#[test]
fn test_new_file_merges_with_existing_entries() {
    let tmp = TempDir::new().unwrap();
    write_asset(tmp.path(), "B.rfa", "Windows");
    Indexer::new(&PortableHost).build_index(tmp.path()).unwrap();
    let b_before = CatalogStore::for_root(tmp.path()).load().remove(0);

    write_asset(tmp.path(), "A.rfa", "Doors");
    Indexer::new(&PortableHost).build_index(tmp.path()).unwrap();

    let items = CatalogStore::for_root(tmp.path()).load();
    let names: Vec<&str> = items.iter().map(|i| i.display_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(items[1], b_before);
    assert_eq!(items[0].category, "Doors");
    assert_eq!(items[0].format_version, "2023");
    assert_eq!(items[0].variant_names, vec!["600 x 2100", "900 x 2100"]);
}

#[test]
fn test_display_mode_is_exclusive() {
    let plain = tagged_item("Plain", &[]);
    let three_d = tagged_item("Solid", &["3D"]);
    let mut engine = FilterEngine::default();

    engine.set_mode(DisplayMode::TwoD);
    assert!(engine.matches(&plain));
    assert!(!engine.matches(&three_d));

    engine.set_mode(DisplayMode::ThreeD);
    assert!(engine.matches(&plain));
    assert!(engine.matches(&three_d));
}

#[test]
fn test_active_groups_filter_by_union() {
    let policy = TagPolicy {
        groups: vec![
            ToggleGroup::new("G1", &["x", "y"]),
            ToggleGroup::new("G2", &["z"]),
        ],
        ..TagPolicy::default()
    };
    let mut engine = FilterEngine::new(policy);
    engine.set_group("G1", true);
    engine.set_group("G2", true);

    assert!(engine.passes_groups(&tagged_item("Z", &["z"])));
    assert!(!engine.passes_groups(&tagged_item("W", &["w"])));
}

#[test]
fn test_cancelled_batch_imports_nothing() {
    let lib = TempDir::new().unwrap();
    let ws_dir = TempDir::new().unwrap();
    let window = write_asset(lib.path(), "Window.rfa", "Windows");
    let door = write_asset(lib.path(), "Door.rfa", "Doors");
    fs::write(ws_dir.path().join("Door.rfa"), b"original").unwrap();

    let mut workspace = DirectoryWorkspace::open(ws_dir.path(), AssetPattern::default()).unwrap();
    let mut resolver = ScriptedResolver::new([ConflictChoice::Cancel]);
    let mut placement = DeferredPlacement::new(IdleFlag::default());
    let request = LoadRequest::new(vec![window, door]);

    let outcome = load_selected(&mut workspace, &request, &mut resolver, &mut placement).unwrap();
    assert_eq!(outcome, LoadOutcome::Cancelled);
    assert!(!ws_dir.path().join("Window.rfa").exists());
    assert_eq!(fs::read(ws_dir.path().join("Door.rfa")).unwrap(), b"original");
    assert!(!placement.is_armed());
}

#[test]
fn test_thumbnails_are_square_and_source_untouched() {
    let tmp = TempDir::new().unwrap();
    let asset = write_asset(tmp.path(), "Doors/Door.rfa", "Doors");
    let source = fs::read(&asset).unwrap();

    let (mut queue, completed) = TaskQueue::new();
    queue.submit(TaskRequest::GenerateThumbnails {
        root: tmp.path().to_path_buf(),
        pixel_size: 48,
        reindex: true,
    });
    let host = PortableHost;
    let mut executor = LibraryExecutor::new(&host);
    assert_eq!(queue.run_all(&mut executor), 1);

    let done = completed.try_recv().unwrap();
    match done.result.unwrap() {
        TaskResult::Thumbnails { report, index } => {
            assert_eq!(report.rendered, 2);
            assert_eq!(index.map(|r| r.updated), Some(1));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let thumb = image::open(tmp.path().join("Thumbs_Types/Doors/Door/600 x 2100.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(thumb.dimensions(), (48, 48));
    // tall render: padded left and right, content in the middle
    assert_eq!(thumb.get_pixel(0, 24).0, [255, 255, 255]);
    assert_ne!(thumb.get_pixel(24, 24).0, [255, 255, 255]);
    assert!(tmp.path().join("Thumbs/Doors/Door.png").is_file());
    assert_eq!(fs::read(&asset).unwrap(), source);
}

#[test]
fn test_item_tags_are_case_insensitively_unique() {
    let tmp = TempDir::new().unwrap();
    write_asset(tmp.path(), "Door.rfa", "Doors");
    Indexer::new(&PortableHost).build_index(tmp.path()).unwrap();

    let settings = Settings {
        library_root: tmp.path().to_path_buf(),
        ..Settings::default()
    };
    let mut session = LibrarySession::open(settings.clone()).unwrap();
    let index = session.find("Door").unwrap();
    assert_eq!(session.add_item_tags(index, &["Foo"]).unwrap(), 1);
    assert_eq!(session.add_item_tags(index, &["foo"]).unwrap(), 0);

    let reopened = LibrarySession::open(settings).unwrap();
    let item = reopened.item(index).unwrap();
    assert_eq!(item.user_tags.as_slice(), ["Foo".to_string()]);
    assert!(reopened.vocabulary().contains("Foo"));
}
