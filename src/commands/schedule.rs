use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::schedule::{DailyTrigger, next_run_after};
use chrono::Local;
use owo_colors::OwoColorize;

use super::properties;

pub fn enable(hour: Option<u32>) -> Result<()> {
    let config = AppConfig::load()?;
    let mut properties = properties(&config)?;
    let hour = hour.unwrap_or(config.sync.backup_hour);

    DailyTrigger::new(&mut properties).enable(hour)?;

    println!("{} Daily backup enabled at {:02}:00", "✓".green(), hour);
    println!(
        "   Keep {} running (for example as a system service) to execute it",
        "calsheet run-scheduler".bold()
    );
    Ok(())
}

pub fn disable() -> Result<()> {
    let config = AppConfig::load()?;
    let mut properties = properties(&config)?;

    if DailyTrigger::new(&mut properties).disable()? {
        println!("{} Daily backup disabled", "✓".green());
    } else {
        println!("{}", "Daily backup was not enabled".dimmed());
    }
    Ok(())
}

pub fn status() -> Result<()> {
    let config = AppConfig::load()?;
    let mut properties = properties(&config)?;

    match DailyTrigger::new(&mut properties).hour()? {
        Some(hour) => {
            let next = next_run_after(Local::now(), hour)?;
            println!("Daily backup enabled at {:02}:00", hour);
            println!("   Next run: {}", next.format("%Y-%m-%d %H:%M").dimmed());
        }
        None => println!("{}", "Daily backup disabled".dimmed()),
    }
    Ok(())
}
