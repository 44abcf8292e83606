use anyhow::Result;
use calsheet_core::CalSheetError;
use calsheet_core::config::AppConfig;
use calsheet_core::metadata::MetadataTracker;
use calsheet_core::registry::CalendarRegistry;
use calsheet_core::schedule::DailyTrigger;
use calsheet_core::store::JsonWorkbook;
use owo_colors::OwoColorize;

use super::properties;
use crate::render::Render;

pub fn run() -> Result<()> {
    let config_path = AppConfig::config_path()?;
    let config = AppConfig::load()?;
    let workbook_path = config.workbook_path();
    let mut properties = properties(&config)?;

    println!("{}", "Paths".bold());
    println!("  Config:      {}", config_path.display());
    println!("  Workbook:    {}", workbook_path.display());
    println!("  Properties:  {}", config.properties_path()?.display());

    println!("\n{}", "Backup".bold());
    match &config.provider {
        Some(remote) => println!("  Provider:    {}", remote.provider.name()),
        None => println!("  Provider:    {}", "not configured".red()),
    }
    println!(
        "  Range:       today until {} months ahead",
        config.sync.backup_months_future
    );
    println!("  Refresh:     rows from today onward are deleted and fetched again");
    println!(
        "  Limits:      {}-day windows, {} per run",
        config.sync.window_days, config.sync.execution_limit
    );

    let trigger = DailyTrigger::new(&mut properties).hour()?;
    match trigger {
        Some(hour) => println!("  Schedule:    daily at {:02}:00", hour),
        None => println!("  Schedule:    {}", "disabled".dimmed()),
    }

    let registered = CalendarRegistry::new(&mut properties).list()?;
    println!("\n{} ({})", "Registered calendars".bold(), registered.len());
    for id in &registered {
        println!("  {}", id);
    }

    println!("\n{}", "Last backups".bold());
    let workbook = match JsonWorkbook::open(&workbook_path) {
        Ok(workbook) => workbook,
        Err(CalSheetError::WorkbookNotFound(_)) => {
            println!("  {}", "No workbook yet".dimmed());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let entries = MetadataTracker::new(&config.sync).entries(&workbook)?;
    if entries.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for entry in &entries {
        println!("{}", entry.render());
    }

    Ok(())
}
