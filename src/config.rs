//! Configuration
//!
//! [`UiConfig`] is what a console is built from: palette text, description
//! text, the string table and the dialog palette. Nothing is global; two
//! consoles built from two configs share nothing.
//!
//! [`AppConfig`] is the TOML file the `termwide` binary reads:
//!
//! ```toml
//! ui = "mail.ui"
//! palette = "mail.palette"
//!
//! [strings]
//! FROM = "Your email address"
//!
//! [log]
//! file = "termwide.log"
//! level = "debug"
//!
//! [dialogs.confirm]
//! ui = "confirm.ui"
//! header = "Really send?"
//! height = 8
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

use crate::errors::RuntimeError;
use crate::registry::StringTable;
use crate::ui::dialog::DialogBuilder;
use crate::ui::theme::DEFAULT_DIALOG_PALETTE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything needed to build a console
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub palette: String,
    pub description: String,
    pub strings: StringTable,
    pub dialog_palette: String,
}

impl UiConfig {
    pub fn new(palette: impl Into<String>, description: impl Into<String>) -> Self {
        UiConfig {
            palette: palette.into(),
            description: description.into(),
            strings: StringTable::new(),
            dialog_palette: DEFAULT_DIALOG_PALETTE.to_string(),
        }
    }

    pub fn with_strings(mut self, strings: StringTable) -> Self {
        self.strings = strings;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Strings(#[from] RuntimeError),
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log file; logging is off when absent since the terminal is taken
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: None,
            level: default_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogConfig {
    pub ui: PathBuf,
    #[serde(default)]
    pub palette: Option<PathBuf>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub height: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Description file
    pub ui: PathBuf,
    /// Palette file; no styles when absent
    #[serde(default)]
    pub palette: Option<PathBuf>,
    /// Replaces the built-in dialog palette
    #[serde(default)]
    pub dialog_palette: Option<PathBuf>,
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub dialogs: BTreeMap<String, DialogConfig>,
    #[serde(skip)]
    base_dir: PathBuf,
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read(path)?;
        let mut config: AppConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// `path` relative to the config file
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log.file.as_deref().map(|p| self.resolve(p))
    }

    pub fn string_table(&self) -> Result<StringTable, ConfigError> {
        Ok(StringTable::from_pairs(
            self.strings.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?)
    }

    /// Read every file the console needs
    pub fn ui_config(&self) -> Result<UiConfig, ConfigError> {
        let description = read(&self.resolve(&self.ui))?;
        let palette = match &self.palette {
            Some(path) => read(&self.resolve(path))?,
            None => String::new(),
        };
        let mut config = UiConfig::new(palette, description).with_strings(self.string_table()?);
        if let Some(path) = &self.dialog_palette {
            config.dialog_palette = read(&self.resolve(path))?;
        }
        Ok(config)
    }

    /// Builder for the dialog configured under `name`, sharing the console's strings
    pub fn dialog(&self, name: &str) -> Option<Result<DialogBuilder, ConfigError>> {
        let dialog = self.dialogs.get(name)?;
        Some(self.dialog_builder(dialog))
    }

    fn dialog_builder(&self, dialog: &DialogConfig) -> Result<DialogBuilder, ConfigError> {
        let mut builder =
            DialogBuilder::new(read(&self.resolve(&dialog.ui))?).strings(self.string_table()?);
        if let Some(path) = &dialog.palette {
            builder = builder.palette(read(&self.resolve(path))?);
        }
        if let Some(header) = &dialog.header {
            builder = builder.header(header.clone());
        }
        if let Some(width) = dialog.width {
            builder = builder.width(width);
        }
        if let Some(height) = dialog.height {
            builder = builder.height(height);
        }
        Ok(builder)
    }
}
