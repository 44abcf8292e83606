pub mod backup;
pub mod calendars;
pub mod check;
pub mod daily;
pub mod reset;
pub mod run_scheduler;
pub mod schedule;
pub mod settings;

use anyhow::Result;
use calsheet_core::clock::SystemClock;
use calsheet_core::config::AppConfig;
use calsheet_core::policy::SyncPolicy;
use calsheet_core::properties::PropertyFile;
use calsheet_core::source::ProviderSource;
use calsheet_core::store::JsonWorkbook;

pub use crate::utils::tui::create_spinner;

pub type Policy = SyncPolicy<ProviderSource, JsonWorkbook, PropertyFile, SystemClock>;

/// How to open the workbook.
#[derive(Clone, Copy)]
pub enum WorkbookMode {
    /// Create an empty workbook if there is none yet.
    Create,
    /// Fail if the workbook doesn't exist.
    Existing,
}

pub fn properties(config: &AppConfig) -> Result<PropertyFile> {
    Ok(PropertyFile::new(&config.properties_path()?))
}

pub fn source(config: &AppConfig) -> Result<ProviderSource> {
    let remote = config.remote()?.clone();
    Ok(ProviderSource::new(remote, config.sync.provider_timeout()?))
}

pub fn open_policy(config: &AppConfig, mode: WorkbookMode) -> Result<Policy> {
    let path = config.workbook_path();
    let workbook = match mode {
        WorkbookMode::Create => JsonWorkbook::open_or_create(&path)?,
        WorkbookMode::Existing => JsonWorkbook::open(&path)?,
    };

    Ok(SyncPolicy::new(
        config.sync.clone(),
        source(config)?,
        workbook,
        properties(config)?,
        SystemClock,
    )?)
}
