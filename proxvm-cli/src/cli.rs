//! Command-line argument parsing.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

/// proxvm - select Proxmox VE guests and inspect their configuration
#[derive(Parser, Debug)]
#[command(name = "proxvm")]
#[command(about = "Select Proxmox VE guests and inspect their configuration")]
#[command(version)]
pub struct Args {
    /// Path to settings file (optional, defaults used if not found)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Inventory file (YAML or JSON) describing the cluster
    #[arg(short, long, env = "PROXVM_INVENTORY")]
    pub inventory: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the guests selected by an expression (e.g. "all,-100", "web%", "100:199")
    List {
        /// Selector expression
        expression: String,
    },

    /// Show the disks of one guest
    Disks {
        /// Guest id or name
        vm: String,
    },

    /// Show a summary of one guest's configuration
    Show {
        /// Guest id or name
        vm: String,
    },

    /// Print the configuration of one guest, followed by its snapshots
    Config {
        /// Guest id or name
        vm: String,

        /// Skip snapshot sections
        #[arg(long)]
        current_only: bool,
    },
}

/// How command results are printed.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
