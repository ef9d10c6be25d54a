//! Configuration for fieldcore hosts.
//!
//! ```toml
//! [field]
//! locale = "de-CH"
//! has_time = true
//! time_picker_resolution = 15
//! allowed_dates = ["2016-04-16", "2016-07-14"]
//!
//! [log]
//! filter = "fieldcore_engine=trace"
//! ```

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldcoreConfig {
    pub field: Option<FieldConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Shape and behavior of the date field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    /// Locale tag such as `de-CH` or `en-US`.
    pub locale: Option<String>,
    /// Overrides the locale's date pattern.
    pub date_pattern: Option<String>,
    /// Overrides the locale's time pattern.
    pub time_pattern: Option<String>,
    #[serde(default = "default_true")]
    pub has_date: bool,
    #[serde(default)]
    pub has_time: bool,
    /// Minutes per time picker step. Values below 1 disable the time popup.
    pub time_picker_resolution: Option<i32>,
    /// Reference date used instead of "now".
    pub auto_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub allowed_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub embedded: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            locale: None,
            date_pattern: None,
            time_pattern: None,
            has_date: true,
            has_time: false,
            time_picker_resolution: None,
            auto_date: None,
            allowed_dates: Vec::new(),
            embedded: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive. `RUST_LOG` wins when set.
    pub filter: Option<String>,
}

impl FieldcoreConfig {
    /// Load `~/.fieldcore/config.toml`. `Ok(None)` if there is none.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load the config at `path`. `Ok(None)` if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// The `[field]` section, or defaults when absent.
    #[must_use]
    pub fn field(&self) -> FieldConfig {
        self.field.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_ref().and_then(|log| log.filter.as_deref())
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".fieldcore").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = FieldcoreConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn parses_field_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
[field]
locale = "en-US"
has_time = true
time_picker_resolution = 15
auto_date = "2016-04-15T00:00:00"
allowed_dates = ["2016-07-14", "2016-04-16"]

[log]
filter = "debug"
"#,
        );
        let config = FieldcoreConfig::load_from(&path).unwrap().unwrap();
        let field = config.field();
        assert_eq!(field.locale.as_deref(), Some("en-US"));
        assert!(field.has_date);
        assert!(field.has_time);
        assert_eq!(field.time_picker_resolution, Some(15));
        assert_eq!(
            field.auto_date,
            NaiveDate::from_ymd_opt(2016, 4, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(field.allowed_dates.len(), 2);
        assert_eq!(config.log_filter(), Some("debug"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "");
        let config = FieldcoreConfig::load_from(&path).unwrap().unwrap();
        let field = config.field();
        assert!(field.has_date);
        assert!(!field.has_time);
        assert!(field.allowed_dates.is_empty());
        assert!(config.log_filter().is_none());
    }

    #[test]
    fn parse_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[field]\nhas_time = \"yes\"\n");
        let err = FieldcoreConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn config_path_lives_in_home() {
        if let Some(path) = config_path() {
            assert!(path.ends_with(".fieldcore/config.toml"));
        }
    }
}
