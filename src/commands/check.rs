use anyhow::Result;
use calsheet_core::config::AppConfig;
use owo_colors::OwoColorize;

use super::{WorkbookMode, create_spinner, open_policy};
use crate::render::Render;

/// Run one incremental backup of the provider's default calendar to confirm
/// that the workbook, the provider and the sync engine all work.
pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    let mut policy = open_policy(&config, WorkbookMode::Create)?;
    println!("{} Workbook: {}", "✓".green(), config.workbook_path().display());

    let spinner = create_spinner("Backing up the default calendar".to_string());
    let result = policy.self_check().await;
    spinner.finish_and_clear();
    let check = result?;

    println!("{}", check.render());
    Ok(())
}
