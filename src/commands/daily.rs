use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::policy::DailySummary;

use super::{WorkbookMode, open_policy};
use crate::render::Render;

/// Incremental backup of every registered calendar into the existing workbook.
pub async fn backup_registered() -> Result<DailySummary> {
    let config = AppConfig::load()?;
    let mut policy = open_policy(&config, WorkbookMode::Existing)?;

    if policy.registry().list()?.is_empty() {
        anyhow::bail!(
            "No calendars registered for daily backup.\n\n\
            Run a full backup first:\n  \
            calsheet backup"
        );
    }

    Ok(policy.run_daily().await?)
}

pub async fn run() -> Result<()> {
    let summary = backup_registered().await?;
    println!("{}", summary.render());

    if !summary.is_success() {
        anyhow::bail!(
            "{} of {} calendars failed",
            summary.errors.len(),
            summary.errors.len() + summary.sheets.len()
        );
    }

    Ok(())
}
