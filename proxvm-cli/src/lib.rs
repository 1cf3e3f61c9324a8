//! # proxvm CLI
//!
//! Command-line front end for selecting guests and rendering their
//! configuration from a captured inventory.
//!
//! ## Usage
//! ```bash
//! proxvm --inventory cluster.yaml list "all-pve1,-%test%"
//! proxvm --inventory cluster.yaml config web-01
//! ```

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Args, Command, OutputFormat};
pub use config::Settings;
