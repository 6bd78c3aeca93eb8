//! Cache configuration.
//!
//! Settings come from an optional TOML file, then environment overrides,
//! then [`CacheSettings::validate`]. Every field has a default so an
//! empty file (or no file) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default record cache refresh interval: 24 hours.
pub const DEFAULT_RECORD_REFRESH_SECS: u64 = 60 * 60 * 24;
/// Default options cache refresh interval: 7 days.
pub const DEFAULT_OPTIONS_REFRESH_SECS: u64 = 60 * 60 * 24 * 7;
/// File name of the record cache inside the cache directory.
pub const RECORD_CACHE_FILENAME: &str = "record_cache.json";
/// File name of the options cache inside the cache directory.
pub const OPTIONS_CACHE_FILENAME: &str = "options_cache.json";

pub const ENV_CACHE_DIR: &str = "ROSTRA_CACHE_DIR";
pub const ENV_NO_CACHE: &str = "ROSTRA_NO_CACHE";
pub const ENV_RECORD_REFRESH_SECS: &str = "ROSTRA_RECORD_REFRESH_SECS";
pub const ENV_OPTIONS_REFRESH_SECS: &str = "ROSTRA_OPTIONS_REFRESH_SECS";
pub const ENV_PARTITION_ERRORS: &str = "ROSTRA_PARTITION_ERRORS";

/// How a partition whose response could not be parsed is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionErrorPolicy {
    /// Log parse failures and drop the partition; only transport
    /// failures are returned to the caller.
    #[default]
    Lenient,
    /// Return parse failures alongside transport failures.
    Strict,
}

impl PartitionErrorPolicy {
    pub fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl FromStr for PartitionErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::InvalidValue {
                field: "partition_errors".to_string(),
                reason: format!("expected 'lenient' or 'strict', got '{}'", other),
            }),
        }
    }
}

/// Settings for the record and options caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    /// Directory holding the cache files. Must already exist.
    /// `None` selects the OS temporary directory.
    pub directory: Option<PathBuf>,
    /// Bypass the cache files entirely and always fetch live.
    pub caching_disabled: bool,
    pub record_refresh_secs: u64,
    pub options_refresh_secs: u64,
    pub partition_errors: PartitionErrorPolicy,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: None,
            caching_disabled: false,
            record_refresh_secs: DEFAULT_RECORD_REFRESH_SECS,
            options_refresh_secs: DEFAULT_OPTIONS_REFRESH_SECS,
            partition_errors: PartitionErrorPolicy::Lenient,
        }
    }
}

impl CacheSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from an optional TOML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        let settings = settings.with_overrides(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|err| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse {
            reason: err.to_string(),
        })
    }

    /// Apply overrides looked up by environment variable name.
    ///
    /// The lookup is injected so callers (and tests) can supply values
    /// without touching the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|s| !s.trim().is_empty()) {
            self.directory = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(ENV_NO_CACHE) {
            self.caching_disabled = parse_flag(ENV_NO_CACHE, &value)?;
        }
        if let Some(value) = lookup(ENV_RECORD_REFRESH_SECS) {
            self.record_refresh_secs = parse_secs(ENV_RECORD_REFRESH_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_OPTIONS_REFRESH_SECS) {
            self.options_refresh_secs = parse_secs(ENV_OPTIONS_REFRESH_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_PARTITION_ERRORS) {
            self.partition_errors = value.parse()?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_refresh_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "record_refresh_secs".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if self.options_refresh_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "options_refresh_secs".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        if let Some(dir) = &self.directory {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "directory".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configured directory, or the OS temporary directory.
    pub fn cache_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn record_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.record_refresh_secs)
    }

    pub fn options_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.options_refresh_secs)
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_caching_disabled(mut self, disabled: bool) -> Self {
        self.caching_disabled = disabled;
        self
    }

    pub fn with_record_refresh(mut self, interval: Duration) -> Self {
        self.record_refresh_secs = interval.as_secs();
        self
    }

    pub fn with_options_refresh(mut self, interval: Duration) -> Self {
        self.options_refresh_secs = interval.as_secs();
        self
    }

    pub fn with_partition_errors(mut self, policy: PartitionErrorPolicy) -> Self {
        self.partition_errors = policy;
        self
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: format!("expected whole seconds, got '{}'", value.trim()),
    })
}
