use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::registry::CalendarRegistry;
use calsheet_core::source::EventSource;
use owo_colors::OwoColorize;

use super::{create_spinner, properties, source};
use crate::render::Render;

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    let source = source(&config)?;
    let mut properties = properties(&config)?;
    let registered = CalendarRegistry::new(&mut properties).list()?;

    let spinner = create_spinner(format!("Fetching calendars from {}", source.provider().name()));
    let result = source.list_calendars().await;
    spinner.finish_and_clear();
    let calendars = result?;

    if calendars.is_empty() {
        println!("{}", "No calendars found".dimmed());
        return Ok(());
    }

    for calendar in &calendars {
        let marker = if registered.contains(&calendar.id) {
            " ✓ daily".green().to_string()
        } else {
            String::new()
        };
        println!("{}{}", calendar.render(), marker);
        println!("   {}", calendar.id.dimmed());
    }

    Ok(())
}
