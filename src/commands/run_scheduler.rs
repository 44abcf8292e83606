use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::schedule::{DailyTrigger, next_run_after};
use chrono::Local;
use tracing::info;

use super::properties;

fn trigger_hour(config: &AppConfig) -> Result<Option<u32>> {
    let mut properties = properties(config)?;
    Ok(DailyTrigger::new(&mut properties).hour()?)
}

/// Sleep until the trigger hour, run the daily backup, repeat.
/// Returns once the trigger is disabled.
pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;

    loop {
        let Some(hour) = trigger_hour(&config)? else {
            println!("Daily backup is disabled. Enable it with: calsheet schedule enable");
            return Ok(());
        };

        let now = Local::now();
        let next = next_run_after(now, hour)?;
        info!(next_run = %next.format("%Y-%m-%d %H:%M"), "waiting for next daily backup");
        tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;

        // The trigger may have been disabled or moved while sleeping.
        if trigger_hour(&config)? != Some(hour) {
            continue;
        }

        crate::daily_backup_trigger().await;
    }
}
