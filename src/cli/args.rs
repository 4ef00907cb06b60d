//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Replicate a project hierarchy from a source site to a target site
#[derive(Parser, Debug)]
#[command(name = "projsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ./projsync.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save all source projects to the raw snapshot
    Fetch,

    /// Build the hierarchy from the raw snapshot
    Clean {
        /// Source project id to re-root at (overrides sync.top_level_project_id)
        #[arg(short, long)]
        scope: Option<String>,
        /// Fail if the scope project is not in the snapshot
        #[arg(long)]
        require_scope: bool,
    },

    /// Create the cleaned hierarchy on the target site
    Push {
        /// Show what would be ensured without touching the target
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Fetch, clean and push
    Sync {
        /// Source project id to re-root at (overrides sync.top_level_project_id)
        #[arg(short, long)]
        scope: Option<String>,
        /// Fail if the scope project is not in the snapshot
        #[arg(long)]
        require_scope: bool,
        /// Show what would be ensured without touching the target
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Show the cleaned hierarchy as tree
    Tree,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config (secrets masked)
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
