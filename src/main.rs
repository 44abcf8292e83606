mod commands;
mod render;
mod utils;

use anyhow::Result;
use calsheet_core::CalSheetError;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "calsheet=info,calsheet_core=info";

#[derive(Parser)]
#[command(name = "calsheet")]
#[command(about = "Back up your calendars into a spreadsheet-style workbook")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the provider's calendars
    Calendars,
    /// Full backup of one calendar, which also registers it for daily backups
    Backup {
        /// Calendar id (prompts when omitted)
        #[arg(short, long)]
        calendar: Option<String>,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Delete every calendar sheet and metadata entry first
        #[arg(long)]
        reset_all: bool,
    },
    /// Refresh today and future events of every registered calendar
    Daily,
    /// Back up the default calendar once to check that everything works
    Check,
    /// Manage the daily trigger
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// Run in the foreground, starting the daily backup at the trigger hour
    RunScheduler,
    /// Show the current settings and backup state
    Settings,
    /// Remove the daily trigger and forget registered calendars
    Reset {
        /// Don't ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Run the daily backup at `hour` (defaults to `backup_hour` from the config)
    Enable {
        #[arg(long)]
        hour: Option<u32>,
    },
    Disable,
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calendars => commands::calendars::run().await,
        Commands::Backup {
            calendar,
            yes,
            reset_all,
        } => commands::backup::run(calendar, yes, reset_all).await,
        Commands::Daily => commands::daily::run().await,
        Commands::Check => commands::check::run().await,
        Commands::Schedule { action } => match action {
            ScheduleAction::Enable { hour } => commands::schedule::enable(hour),
            ScheduleAction::Disable => commands::schedule::disable(),
            ScheduleAction::Status => commands::schedule::status(),
        },
        Commands::RunScheduler => commands::run_scheduler::run().await,
        Commands::Settings => commands::settings::run(),
        Commands::Reset { force } => commands::reset::run(force),
    }
}

/// Entry point of the scheduled daily job. Takes no arguments and reports
/// only through logging.
pub async fn daily_backup_trigger() {
    match commands::daily::backup_registered().await {
        Ok(summary) if summary.is_success() => info!(
            total_events = summary.total_events,
            sheets = summary.sheets.len(),
            "daily backup completed"
        ),
        Ok(summary) => error!(
            total_events = summary.total_events,
            failed = summary.errors.len(),
            "daily backup completed with errors"
        ),
        Err(e) => {
            let kind = e.downcast_ref::<CalSheetError>().map(CalSheetError::kind);
            error!(error = %e, ?kind, "daily backup failed");
        }
    }
}
