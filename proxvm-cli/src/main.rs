//! # proxvm
//!
//! Resolves selector expressions and renders guest configurations from an
//! inventory file.
//!
//! ## Usage
//! ```bash
//! proxvm --inventory cluster.yaml disks 100
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use proxvm_cli::{commands, Args, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load settings
    let settings = Settings::from_args(&args)?;

    // Initialize logging
    proxvm_common::init(&settings.log.level, settings.log.format()?)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting proxvm"
    );

    match commands::run(&settings, &args.command).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
