//! Logging initialization using tracing.

use anyhow::{anyhow, Result};
use std::str::FromStr;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output with targets and source locations
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("Unknown log format: {}", other)),
        }
    }
}

/// Initialize logging in the given format.
pub fn init(level: &str, format: LogFormat) -> Result<()> {
    match format {
        LogFormat::Pretty => init_logging(level),
        LogFormat::Json => init_logging_json(level),
    }
}

/// Human-readable logs on stderr, with source locations.
///
/// `RUST_LOG`, when set, takes precedence over `level`. Fails if a global
/// subscriber is already installed.
///
/// ```
/// proxvm_common::init_logging("info").unwrap();
/// ```
pub fn init_logging(level: &str) -> Result<()> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true);

    install(tracing_subscriber::registry().with(env_filter(level)).with(layer).try_init())
}

/// One JSON object per log line on stderr.
pub fn init_logging_json(level: &str) -> Result<()> {
    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_current_span(true);

    install(tracing_subscriber::registry().with(env_filter(level)).with(layer).try_init())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn install(result: std::result::Result<(), TryInitError>) -> Result<()> {
    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
