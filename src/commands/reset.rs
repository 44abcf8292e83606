use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::registry::CalendarRegistry;
use calsheet_core::schedule::DailyTrigger;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::properties;

/// Forget the trigger and the registered calendars. Backed-up data stays.
pub fn run(force: bool) -> Result<()> {
    let config = AppConfig::load()?;
    let mut properties = properties(&config)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Remove the daily trigger and all registered calendars?")
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let had_trigger = DailyTrigger::new(&mut properties).disable()?;
    let mut registry = CalendarRegistry::new(&mut properties);
    let count = registry.list()?.len();
    registry.clear()?;

    println!("{} Settings reset", "✓".green());
    if had_trigger {
        println!("   Removed the daily trigger");
    }
    println!(
        "   Forgot {} registered {}",
        count,
        if count == 1 { "calendar" } else { "calendars" }
    );
    println!("   {}", "Backed-up sheets were left untouched".dimmed());
    Ok(())
}
