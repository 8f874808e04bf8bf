//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::StoreConfig;

pub mod commands;

/// Shells supported by the completions command.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// flowstore - git-friendly flow storage, one diffable file per node
#[derive(Parser, Debug)]
#[command(name = "flowstore", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base directory for store files (default: ~/.flowstore)
    #[arg(long, global = true, env = "FLOWSTORE_DIR")]
    pub user_dir: Option<PathBuf>,

    /// Flow snapshot file name or path (default: flows.json)
    #[arg(long, global = true, env = "FLOWSTORE_FLOW_FILE")]
    pub flows: Option<String>,

    /// Per-node directory (default: <flow file stem>_js under the base directory)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Output as JSON (for tooling integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Write the snapshot compactly instead of pretty-printed
    #[arg(long, global = true)]
    pub compact: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Store configuration from the global flags.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            user_dir: self.user_dir.clone(),
            flow_file: self.flows.clone(),
            flow_dir: self.dir.clone(),
            pretty: !self.compact,
            ..StoreConfig::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split the flow snapshot into one file per node
    Split,

    /// Join the per-node files back into a flow snapshot
    Join,

    /// Compare the per-node files against the snapshot
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
