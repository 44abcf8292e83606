use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::source::EventSource;
use dialoguer::{Confirm, Select};
use owo_colors::OwoColorize;

use super::{WorkbookMode, create_spinner, open_policy};
use crate::render::Render;

pub async fn run(calendar: Option<String>, yes: bool, reset_all: bool) -> Result<()> {
    let config = AppConfig::load()?;
    let mut policy = open_policy(&config, WorkbookMode::Create)?;

    let calendar_id = match calendar {
        Some(id) => id,
        None => select_calendar(&policy).await?,
    };

    let spinner = create_spinner("Estimating event volume".to_string());
    let plan = policy.prepare_full(&calendar_id).await;
    spinner.finish_and_clear();
    let plan = plan?;

    println!("{}", plan.render());

    if plan.requires_confirmation && !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "About {} events found, this may take a while. Continue?",
                plan.estimate
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    if reset_all {
        let confirmed = yes
            || Confirm::new()
                .with_prompt("Delete every calendar sheet and metadata entry first?")
                .default(false)
                .interact()?;

        if confirmed {
            let deleted = policy.reset_workbook()?;
            println!("   Deleted {} {}", deleted, if deleted == 1 { "sheet" } else { "sheets" });
        }
    }

    println!();
    let report = policy.execute_full(&plan).await?;
    println!("{}", report.render());
    println!(
        "\n{} is now backed up daily. Enable the schedule with {}",
        plan.calendar.name,
        "calsheet schedule enable".bold()
    );

    Ok(())
}

async fn select_calendar(policy: &super::Policy) -> Result<String> {
    let spinner = create_spinner("Fetching calendars".to_string());
    let result = policy.source().list_calendars().await;
    let default_id = policy.source().default_calendar_id().await.ok();
    spinner.finish_and_clear();
    let calendars = result?;

    if calendars.is_empty() {
        anyhow::bail!("The provider returned no calendars");
    }

    let items: Vec<String> = calendars.iter().map(|c| c.render()).collect();
    let default = default_id
        .and_then(|id| calendars.iter().position(|c| c.id == id))
        .or_else(|| calendars.iter().position(|c| c.is_primary))
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Calendar to back up")
        .items(&items)
        .default(default)
        .interact()?;

    Ok(calendars[selection].id.clone())
}
