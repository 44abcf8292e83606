//! calsheet configuration.
//!
//! `AppConfig` lives at ~/.config/calsheet/config.toml. The `[sync]` table
//! maps to `SyncConfig`, which is handed to the sync engine explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKUP_HOUR, DEFAULT_BACKUP_MONTHS_FUTURE, DEFAULT_ESTIMATE_SAMPLE_DAYS,
    DEFAULT_ESTIMATE_THRESHOLD, DEFAULT_EXECUTION_LIMIT, DEFAULT_FULL_BACKUP_START,
    DEFAULT_PROVIDER_TIMEOUT, DEFAULT_SHEET_PREFIX, DEFAULT_WINDOW_DAYS,
};
use crate::date_range::parse_date_start;
use crate::error::{CalSheetError, CalSheetResult};
use crate::source::Remote;

static DEFAULT_WORKBOOK_PATH: &str = "~/calsheet/workbook.json";

fn default_workbook_path() -> PathBuf {
    PathBuf::from(DEFAULT_WORKBOOK_PATH)
}

fn default_backup_months_future() -> u32 {
    DEFAULT_BACKUP_MONTHS_FUTURE
}

fn default_backup_hour() -> u32 {
    DEFAULT_BACKUP_HOUR
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_execution_limit() -> String {
    DEFAULT_EXECUTION_LIMIT.to_string()
}

fn default_estimate_threshold() -> u64 {
    DEFAULT_ESTIMATE_THRESHOLD
}

fn default_estimate_sample_days() -> i64 {
    DEFAULT_ESTIMATE_SAMPLE_DAYS
}

fn default_full_backup_start() -> String {
    DEFAULT_FULL_BACKUP_START.to_string()
}

fn default_sheet_prefix() -> String {
    DEFAULT_SHEET_PREFIX.to_string()
}

fn default_provider_timeout() -> String {
    DEFAULT_PROVIDER_TIMEOUT.to_string()
}

/// Knobs of the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How far past now a backup reaches.
    #[serde(default = "default_backup_months_future")]
    pub backup_months_future: u32,

    /// Local hour (0-23) of the daily run.
    #[serde(default = "default_backup_hour")]
    pub backup_hour: u32,

    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Wall-clock budget per backup, e.g. "5m" or "90s".
    #[serde(default = "default_execution_limit")]
    pub execution_limit: String,

    #[serde(default = "default_estimate_threshold")]
    pub estimate_threshold: u64,

    #[serde(default = "default_estimate_sample_days")]
    pub estimate_sample_days: i64,

    /// First day of a full backup, YYYY-MM-DD.
    #[serde(default = "default_full_backup_start")]
    pub full_backup_start: String,

    #[serde(default = "default_sheet_prefix")]
    pub sheet_prefix: String,

    #[serde(default = "default_provider_timeout")]
    pub provider_timeout: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            backup_months_future: default_backup_months_future(),
            backup_hour: default_backup_hour(),
            window_days: default_window_days(),
            execution_limit: default_execution_limit(),
            estimate_threshold: default_estimate_threshold(),
            estimate_sample_days: default_estimate_sample_days(),
            full_backup_start: default_full_backup_start(),
            sheet_prefix: default_sheet_prefix(),
            provider_timeout: default_provider_timeout(),
        }
    }
}

fn parse_duration(key: &str, value: &str) -> CalSheetResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| CalSheetError::Config(format!("Invalid {key} '{value}': {e}")))
}

impl SyncConfig {
    pub fn execution_limit(&self) -> CalSheetResult<Duration> {
        parse_duration("execution_limit", &self.execution_limit)
    }

    pub fn provider_timeout(&self) -> CalSheetResult<Duration> {
        parse_duration("provider_timeout", &self.provider_timeout)
    }

    pub fn full_backup_start(&self) -> CalSheetResult<DateTime<Local>> {
        parse_date_start(&self.full_backup_start)
    }

    /// Check every field once so that later use cannot fail on bad input.
    pub fn validate(&self) -> CalSheetResult<()> {
        if self.backup_hour > 23 {
            return Err(CalSheetError::Config(format!(
                "backup_hour must be between 0 and 23, got {}",
                self.backup_hour
            )));
        }
        if self.window_days < 1 {
            return Err(CalSheetError::Config("window_days must be at least 1".into()));
        }
        if self.estimate_sample_days < 1 {
            return Err(CalSheetError::Config(
                "estimate_sample_days must be at least 1".into(),
            ));
        }
        self.execution_limit()?;
        self.provider_timeout()?;
        self.full_backup_start()?;
        Ok(())
    }
}

fn default_properties_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("calsheet").join("properties.json"))
}

/// Global configuration at ~/.config/calsheet/config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_workbook_path")]
    pub workbook_path: PathBuf,

    #[serde(default)]
    pub properties_path: Option<PathBuf>,

    /// Calendar provider, e.g. `provider = "google"` plus its parameters.
    #[serde(default)]
    pub provider: Option<Remote>,

    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn config_path() -> CalSheetResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSheetError::Config("Could not determine config directory".into()))?
            .join("calsheet");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, writing a commented default on first use.
    pub fn load() -> CalSheetResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CalSheetResult<Self> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| CalSheetError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalSheetError::Config(e.to_string()))?;

        config.sync.validate()?;
        Ok(config)
    }

    /// Workbook location with `~` expanded.
    pub fn workbook_path(&self) -> PathBuf {
        expand(&self.workbook_path)
    }

    pub fn properties_path(&self) -> CalSheetResult<PathBuf> {
        match &self.properties_path {
            Some(path) => Ok(expand(path)),
            None => default_properties_path().ok_or_else(|| {
                CalSheetError::Config("Could not determine config directory".into())
            }),
        }
    }

    /// The configured provider, or an error telling the user how to add one.
    pub fn remote(&self) -> CalSheetResult<&Remote> {
        self.provider.as_ref().ok_or_else(|| {
            CalSheetError::Config(
                "No calendar provider configured. Add a [provider] table to config.toml".into(),
            )
        })
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalSheetResult<()> {
        let contents = format!(
            "\
# calsheet configuration

# Where backed-up events are stored:
# workbook_path = \"{DEFAULT_WORKBOOK_PATH}\"

# Registered calendars and the daily trigger (defaults to properties.json
# next to this file):
# properties_path = \"~/.config/calsheet/properties.json\"

# Calendar provider (calsheet-provider-<name> must be in PATH):
# [provider]
# provider = \"google\"
# google_account = \"you@example.com\"

# [sync]
# backup_months_future = {DEFAULT_BACKUP_MONTHS_FUTURE}
# backup_hour = {DEFAULT_BACKUP_HOUR}
# window_days = {DEFAULT_WINDOW_DAYS}
# execution_limit = \"{DEFAULT_EXECUTION_LIMIT}\"
# estimate_threshold = {DEFAULT_ESTIMATE_THRESHOLD}
# estimate_sample_days = {DEFAULT_ESTIMATE_SAMPLE_DAYS}
# full_backup_start = \"{DEFAULT_FULL_BACKUP_START}\"
# sheet_prefix = \"{DEFAULT_SHEET_PREFIX}\"
# provider_timeout = \"{DEFAULT_PROVIDER_TIMEOUT}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalSheetError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalSheetError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_defaults() {
        let sync = SyncConfig::default();
        assert_eq!(sync.window_days, 30);
        assert_eq!(sync.execution_limit().unwrap(), Duration::from_secs(300));
        assert_eq!(sync.provider_timeout().unwrap(), Duration::from_secs(60));
        assert_eq!(sync.estimate_threshold, 500);
        assert!(sync.validate().is_ok());
    }

    #[test]
    fn test_default_config_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calsheet/config.toml");
        AppConfig::create_default_config(&path).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.workbook_path, default_workbook_path());
        assert!(config.provider.is_none());
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn test_default_config_file_documents_every_sync_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        AppConfig::create_default_config(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        let defaults = serde_json::to_value(SyncConfig::default()).unwrap();
        for key in defaults.as_object().unwrap().keys() {
            assert!(
                contents.contains(&format!("# {key} = ")),
                "{key} missing from default config"
            );
        }
        assert!(contents.contains("# properties_path = "));
    }

    #[test]
    fn test_load_provider_and_sync_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
workbook_path = "/tmp/book.json"

[provider]
provider = "google"
google_account = "me@example.com"

[sync]
window_days = 7
execution_limit = "90s"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.workbook_path(), PathBuf::from("/tmp/book.json"));
        assert_eq!(config.remote().unwrap().provider.name(), "google");
        assert_eq!(config.sync.window_days, 7);
        assert_eq!(config.sync.execution_limit().unwrap(), Duration::from_secs(90));
        assert_eq!(config.sync.backup_hour, 5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let sync = SyncConfig {
            backup_hour: 24,
            ..SyncConfig::default()
        };
        assert!(matches!(sync.validate(), Err(CalSheetError::Config(_))));

        let sync = SyncConfig {
            execution_limit: "soon".into(),
            ..SyncConfig::default()
        };
        assert!(sync.validate().is_err());
    }

    #[test]
    fn test_missing_provider() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert!(config.remote().is_err());
    }
}
