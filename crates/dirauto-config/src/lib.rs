//! dirauto configuration
//!
//! Settings are read from `dirauto.toml` and may be overridden through
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "dirauto.toml";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DirConfig {
    /// Direction estimation settings
    pub bidi: BidiConfig,
    /// Attribute escaping settings
    pub escape: EscapeConfig,
}

/// Direction estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BidiConfig {
    /// When false, `dir` attributes are left alone and nothing is escaped
    pub enabled: bool,
    /// Rule used to classify a string
    pub heuristic: HeuristicSetting,
    /// Locale id used by `dir="locale"` (e.g. "en", "ar", "he-IL")
    pub locale: String,
}

/// Classification rule selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicSetting {
    /// Any strong RTL character makes the text RTL
    #[default]
    RtlDominant,
    /// The first strong character decides
    FirstStrong,
}

impl HeuristicSetting {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rtl-dominant" | "rtl_dominant" => Some(Self::RtlDominant),
            "first-strong" | "first_strong" => Some(Self::FirstStrong),
            _ => None,
        }
    }
}

/// Attribute escaping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscapeConfig {
    /// Attributes never escaped, as `tag:attr` (`*` matches any tag).
    /// An entry without a colon applies to every tag.
    pub exempt: Vec<String>,
}

impl Default for BidiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            heuristic: HeuristicSetting::default(),
            locale: "en".to_string(),
        }
    }
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            exempt: vec![
                "*:dir".to_string(),
                "*:ng-bind-template".to_string(),
                "input:value".to_string(),
                "textarea:value".to_string(),
            ],
        }
    }
}

impl EscapeConfig {
    /// Exemptions split into `(tag, attribute)` pairs.
    pub fn exemptions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.exempt
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(|entry| match entry.split_once(':') {
                Some((tag, attr)) => (tag.trim(), attr.trim()),
                None => ("*", entry),
            })
    }
}

fn env_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl DirConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `dirauto.toml` in the current directory
    /// or return the defaults if it cannot be read
    pub fn load_or_default() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("DIRAUTO_BIDI") {
            self.bidi.enabled = env_flag(&val);
        }
        if let Ok(val) = std::env::var("DIRAUTO_HEURISTIC") {
            if let Some(heuristic) = HeuristicSetting::parse(&val) {
                self.bidi.heuristic = heuristic;
            }
        }
        if let Ok(locale) = std::env::var("DIRAUTO_LOCALE") {
            self.bidi.locale = locale;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from dirauto.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}
