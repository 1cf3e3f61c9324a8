//! Settings for the proxvm command-line tool.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use proxvm_common::LogFormat;

use crate::cli::{Args, OutputFormat};

/// Main settings structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inventory file used when `--inventory` is not given
    pub inventory: Option<String>,
    /// Logging settings
    pub log: LogSettings,
    /// Output format for command results
    pub output: OutputFormat,
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("Settings file not found: {}", path.display()));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse settings file")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Default settings location: `proxvm/config.yaml` under the platform
    /// config directory (`~/.config` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("proxvm").join("config.yaml"))
    }

    /// Load from `--config` if given, otherwise from the default location,
    /// falling back to defaults when no file exists there. CLI arguments
    /// override whatever was loaded.
    pub fn from_args(args: &Args) -> Result<Self> {
        let settings = match &args.config {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        let settings = settings.with_cli_overrides(args);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply CLI argument overrides to the settings.
    pub fn with_cli_overrides(mut self, args: &Args) -> Self {
        if let Some(ref inventory) = args.inventory {
            self.inventory = Some(inventory.clone());
        }

        if let Some(ref level) = args.log_level {
            self.log.level = level.clone();
        }

        if let Some(ref format) = args.log_format {
            self.log.format = format.clone();
        }

        if let Some(output) = args.output {
            self.output = output;
        }

        debug!(inventory = ?self.inventory, output = ?self.output, "Settings resolved");
        self
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        self.log.format()?;
        if self.log.level.trim().is_empty() {
            anyhow::bail!("log level must not be empty");
        }
        Ok(())
    }

    /// The inventory path, or an error explaining how to provide one.
    pub fn inventory_path(&self) -> Result<&str> {
        self.inventory.as_deref().ok_or_else(|| {
            anyhow::anyhow!("No inventory given; use --inventory, PROXVM_INVENTORY or the settings file")
        })
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LogSettings {
    pub fn format(&self) -> Result<LogFormat> {
        self.format.parse()
    }
}
