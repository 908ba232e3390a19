//! List command - show catalog items through the filters

use super::open_session;
use crate::config::Settings;
use crate::filter::DisplayMode;
use crate::host::Workspace;
use crate::host::portable::DirectoryWorkspace;
use crate::{FamlibError, output};
use colored::Colorize;
use std::path::PathBuf;

type Result<T> = std::result::Result<T, FamlibError>;

/// Filter selection from the command line
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub query: Option<String>,
    pub mode: Option<DisplayMode>,
    pub groups: Vec<String>,
    pub category: Option<String>,
    pub workspace: Option<PathBuf>,
}

/// Execute the list command
///
/// # Errors
/// Returns an error if the library cannot be opened or a group name is unknown
pub fn execute(settings: &Settings, args: &ListArgs, quiet: bool) -> Result<()> {
    let mut session = open_session(settings)?;

    for group in &args.groups {
        if session.filter().policy().group(group).is_none() {
            let known: Vec<&str> = settings.tags.groups.iter().map(|g| g.name.as_str()).collect();
            return Err(FamlibError::InvalidInput(format!(
                "Unknown toggle group '{group}'. Available groups: {}",
                known.join(", ")
            )));
        }
    }

    if let Some(dir) = &args.workspace
        && dir.is_dir()
    {
        let workspace = DirectoryWorkspace::open(dir, settings.pattern()?)?;
        session.mark_loaded(&workspace.asset_names());
    }

    let filter = session.filter_mut();
    if let Some(mode) = args.mode {
        filter.set_mode(mode);
    }
    for group in &args.groups {
        filter.set_group(group, true);
    }
    if let Some(category) = &args.category {
        filter.select_category(category);
    }
    if let Some(query) = &args.query {
        filter.set_query(query);
    }
    session.refilter();

    if let Some(category) = &args.category
        && !crate::tags::eq_ignore_case(session.filter().category(), category.trim())
        && !quiet
    {
        println!(
            "{} '{}' is not offered with the selected groups, showing all categories",
            "Note:".yellow(),
            category
        );
    }

    let visible = session.visible_items();
    if visible.is_empty() {
        if !quiet {
            println!("No assets match.");
        }
        return Ok(());
    }

    if !quiet {
        println!(
            "{} of {} assets ({} mode)",
            visible.len(),
            session.items().len(),
            session.filter().mode()
        );
    }
    for item in &visible {
        println!("{}", output::item_line(item, quiet));
        if !quiet && let Some(line) = output::variants_line(item) {
            println!("{line}");
        }
    }

    if !quiet {
        let categories = session.visible_categories();
        println!("\n{} {}", "Categories:".bold(), categories.join(", "));
    }
    Ok(())
}
