//! famlib CLI application entry point
//!
//! Command-line front end for a design-asset library: it keeps the catalog in
//! sync with the asset files, renders thumbnails, filters the catalog by
//! display mode, toggle groups, category and free text, and imports selected
//! assets into a workspace folder.
//!
//! # Usage
//!
//! ```bash
//! # Synchronize the catalog (and drop entries for deleted files)
//! famlib index --prune
//!
//! # Render 256px thumbnails, then re-index
//! famlib thumbs --size 256
//!
//! # List 2D assets of the electrical group matching "socket"
//! famlib list socket --mode 2d -g EL
//!
//! # Tag an asset and import it into a workspace
//! famlib tag Doors/Door.rfa Uksed
//! famlib load ./project Doors/Door.rfa --place
//!
//! # Quiet mode (only output results)
//! famlib -q list
//! ```
//!
//! # Configuration
//!
//! On first run famlib asks for the library root and thumbnail size. Settings
//! are stored in the user's config directory (`~/.config/famlib/settings.toml`
//! on Linux). Log output is controlled by `FAMLIB_LOG` (default `warn`).

use famlib::{
    FamlibError,
    cli::{Cli, Commands, ConfigCommands, TagsCommands},
    commands::{self, list::ListArgs, load::LoadArgs},
    config::Settings,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, FamlibError>;

const LOG_ENV: &str = "FAMLIB_LOG";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Settings for this run
///
/// Config commands and an explicit `--root` never trigger first-time setup.
/// Unreadable settings fall back to defaults outside of config commands.
fn load_settings(cli: &Cli, command: &Commands) -> Result<Settings> {
    let mut settings = if matches!(command, Commands::Config { .. }) {
        Settings::load()?
    } else if cli.root.is_some() {
        Settings::load_or_default()
    } else {
        Settings::load_or_setup().unwrap_or_else(|e| {
            warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        })
    };

    if let Some(root) = &cli.root {
        debug!(root = %root.display(), "library root overridden");
        settings.library_root.clone_from(root);
    }
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let command = cli.get_command();
    let settings = load_settings(&cli, &command)?;
    let quiet = cli.quiet || settings.quiet;

    match command {
        Commands::Index { prune } => commands::index(&settings, prune, quiet),
        Commands::Thumbs { size, no_index } => {
            commands::thumbs(&settings, size, no_index, quiet)
        }
        Commands::List {
            query,
            mode,
            groups,
            category,
            workspace,
        } => {
            let args = ListArgs {
                query,
                mode,
                groups,
                category,
                workspace,
            };
            commands::list(&settings, &args, quiet)
        }
        Commands::Tag { asset, tags } => commands::tag(&settings, &asset, &tags, quiet),
        Commands::Untag { asset, tags, all } => {
            commands::untag(&settings, &asset, &tags, all, quiet)
        }
        Commands::Tags { command } => {
            let command = command.unwrap_or(TagsCommands::List { unused: false });
            commands::tags(&settings, &command, quiet)
        }
        Commands::Load {
            workspace,
            assets,
            place,
            overwrite,
            skip_existing,
            on_conflict,
        } => {
            let args = LoadArgs {
                workspace,
                assets,
                place,
                overwrite,
                skip_existing,
                on_conflict,
            };
            commands::load(&settings, &args, quiet)
        }
        Commands::Config { command } => {
            let command = command.unwrap_or(ConfigCommands::Show);
            commands::config(settings, &command, quiet)
        }
    }
}
