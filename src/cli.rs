//! Command-line interface definitions and parsing
//!
//! This module defines the complete CLI structure for famlib using the `clap` crate.
//!
//! # Commands
//!
//! - **index**: Synchronize the catalog with the asset tree
//! - **thumbs**: Render asset and variant thumbnails, then re-index
//! - **list**: Show the catalog through the tag and text filters (default)
//! - **tag** / **untag**: Edit the tags of one asset
//! - **tags**: Manage the global tag vocabulary
//! - **load**: Import assets into a workspace folder
//! - **config**: Show or change settings
//!
//! # Examples
//!
//! ```no_run
//! use famlib::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//! match cli.get_command() {
//!     Commands::Index { prune } => println!("prune: {prune}"),
//!     _ => {}
//! }
//! ```

use crate::filter::DisplayMode;
use crate::loader::ConflictChoice;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "famlib")]
#[command(about = "An incremental catalog for design-asset libraries", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Library root (overrides settings)
    #[arg(short = 'r', long = "root", value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Synchronize the catalog with the asset files
    #[command(visible_alias = "i")]
    Index {
        /// Drop entries whose file no longer exists
        #[arg(long = "prune")]
        prune: bool,
    },

    /// Render thumbnails for every asset
    Thumbs {
        /// Thumbnail edge length in pixels (overrides settings)
        #[arg(short = 's', long = "size", value_name = "PIXELS")]
        size: Option<u32>,

        /// Skip the index pass after rendering
        #[arg(long = "no-index")]
        no_index: bool,
    },

    /// List catalog items matching the filters (default)
    #[command(visible_alias = "ls")]
    List {
        /// Free-text query over names, categories, paths, tags and variants
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        /// Display mode (2d or 3d)
        #[arg(short = 'm', long = "mode", value_name = "MODE", value_parser = parse_mode)]
        mode: Option<DisplayMode>,

        /// Activate a toggle group (can specify multiple: -g EL -g EN)
        #[arg(short = 'g', long = "group", value_name = "GROUP")]
        groups: Vec<String>,

        /// Only items carrying this tag
        #[arg(short = 'c', long = "category", value_name = "TAG")]
        category: Option<String>,

        /// Mark items already present in this workspace folder
        #[arg(short = 'w', long = "workspace", value_name = "DIR")]
        workspace: Option<PathBuf>,
    },

    /// Add tags to an asset
    #[command(visible_alias = "t")]
    Tag {
        /// Asset relative path or display name
        #[arg(value_name = "ASSET")]
        asset: String,

        /// Tags to add
        #[arg(value_name = "TAGS", required = true)]
        tags: Vec<String>,
    },

    /// Remove tags from an asset
    #[command(visible_alias = "u")]
    Untag {
        /// Asset relative path or display name
        #[arg(value_name = "ASSET")]
        asset: String,

        /// Tags to remove
        #[arg(value_name = "TAGS", required_unless_present = "all")]
        tags: Vec<String>,

        /// Remove every tag of the asset
        #[arg(short = 'a', long = "all", conflicts_with = "tags")]
        all: bool,
    },

    /// Manage the global tag vocabulary
    Tags {
        #[command(subcommand)]
        command: Option<TagsCommands>,
    },

    /// Import assets into a workspace folder
    #[command(visible_alias = "l")]
    Load {
        /// Workspace folder to import into
        #[arg(value_name = "WORKSPACE")]
        workspace: PathBuf,

        /// Assets to import (relative path, display name or file path)
        #[arg(value_name = "ASSETS", required = true)]
        assets: Vec<String>,

        /// Start placement after importing a single asset
        #[arg(short = 'p', long = "place")]
        place: bool,

        /// Overwrite existing assets without asking
        #[arg(long = "overwrite", conflicts_with = "skip_existing")]
        overwrite: bool,

        /// Skip existing assets without asking
        #[arg(long = "skip-existing", conflicts_with = "overwrite")]
        skip_existing: bool,

        /// Answer every collision prompt with CHOICE
        /// (overwrite, skip, overwrite-all, skip-all, cancel)
        #[arg(
            long = "on-conflict",
            value_name = "CHOICE",
            value_parser = parse_conflict_choice,
            conflicts_with_all = ["overwrite", "skip_existing"]
        )]
        on_conflict: Option<ConflictChoice>,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Tag vocabulary subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TagsCommands {
    /// List all tags with usage counts
    #[command(visible_alias = "ls")]
    List {
        /// Only tags no asset carries
        #[arg(long = "unused")]
        unused: bool,
    },

    /// Add a tag to the vocabulary
    Add {
        /// Tag to add
        tag: String,
    },

    /// Remove a tag from the vocabulary
    #[command(visible_alias = "rm")]
    Remove {
        /// Tag to remove
        tag: String,
    },
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the current settings
    Show,

    /// Set the library root
    #[command(name = "set-root")]
    SetRoot {
        /// Library root folder
        #[arg(value_name = "DIR")]
        root: PathBuf,
    },

    /// Set the thumbnail size
    #[command(name = "set-size")]
    SetSize {
        /// Edge length in pixels
        #[arg(value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
        size: u32,
    },
}

fn parse_mode(s: &str) -> Result<DisplayMode, String> {
    s.parse()
}

fn parse_conflict_choice(s: &str) -> Result<ConflictChoice, String> {
    ConflictChoice::from_response(s).ok_or_else(|| {
        format!("invalid choice '{s}' (use overwrite, skip, overwrite-all, skip-all or cancel)")
    })
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command to execute, defaulting to an unfiltered list
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::List {
            query: None,
            mode: None,
            groups: Vec::new(),
            category: None,
            workspace: None,
        })
    }
}
