//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dyntree/dyntree.toml`, or an explicit file
//! 3. Environment variables: `DYNTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::path::DEFAULT_SEPARATOR;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("environment override: {0}")]
    Env(String),
}

/// Settings for the `dyntree` command line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Separator for path arguments (default: `.`)
    pub separator: char,
    /// Indentation unit for printed documents (default: two spaces)
    pub indent: String,
    /// Prefix for every printed line after the first (default: empty)
    pub prefix: String,
    /// Refuse to create missing intermediate objects on `set`
    pub strict: bool,
    /// Write mutations back to the input file instead of printing them
    pub in_place: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            indent: "  ".into(),
            prefix: String::new(),
            strict: false,
            in_place: false,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "inherit".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub separator: Option<char>,
    pub indent: Option<String>,
    pub prefix: Option<String>,
    pub strict: Option<bool>,
    pub in_place: Option<bool>,
}

/// Get the XDG config directory for dyntree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dyntree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dyntree.toml"))
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            separator: overlay.separator.unwrap_or(self.separator),
            indent: overlay.indent.clone().unwrap_or_else(|| self.indent.clone()),
            prefix: overlay.prefix.clone().unwrap_or_else(|| self.prefix.clone()),
            strict: overlay.strict.unwrap_or(self.strict),
            in_place: overlay.in_place.unwrap_or(self.in_place),
        }
    }

    /// Load settings from defaults, the global config file and `DYNTREE_*`.
    ///
    /// A missing global config file is not an error.
    pub fn load() -> Result<Self, SettingsError> {
        let raw = match global_config_path() {
            Some(path) if path.exists() => Some(load_raw_settings(&path)?),
            _ => None,
        };
        Self::layered(raw)
    }

    /// Load settings using `config_file` in place of the global config file.
    ///
    /// The file must exist.
    #[instrument(level = "debug")]
    pub fn load_from(config_file: &Path) -> Result<Self, SettingsError> {
        let raw = load_raw_settings(config_file)?;
        debug!("merged config file {}", config_file.display());
        Self::layered(Some(raw))
    }

    fn layered(raw: Option<RawSettings>) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let current = match raw {
            Some(raw) => defaults.merge_with(&raw),
            None => defaults,
        };
        Self::apply_env_overrides(current)
    }

    /// Apply DYNTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("DYNTREE").separator("__"))
            .build()
            .map_err(|e| SettingsError::Env(e.to_string()))?;

        if let Ok(val) = config.get_string("separator") {
            let mut chars = val.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => settings.separator = c,
                _ => {
                    return Err(SettingsError::Env(format!(
                        "separator must be a single character, got {:?}",
                        val
                    )))
                }
            }
        }
        if let Ok(val) = config.get_string("indent") {
            settings.indent = val;
        }
        if let Ok(val) = config.get_string("prefix") {
            settings.prefix = val;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_bool("in_place") {
            settings.in_place = val;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            indent: Some("\t".into()),
            strict: Some(true),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.indent, "\t");
        assert!(merged.strict);
        assert_eq!(merged.separator, '.');
        assert_eq!(merged.prefix, "");
    }
}
