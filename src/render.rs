//! TUI rendering traits for calsheet types.
//!
//! Extension traits that add colored terminal rendering to calsheet-core
//! types using owo_colors.

use calsheet_core::CalendarRef;
use calsheet_core::metadata::MetadataEntry;
use calsheet_core::policy::{BackupMode, BackupReport, DailySummary, FullBackupPlan, SelfCheck};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

impl Render for CalendarRef {
    fn render(&self) -> String {
        if self.is_primary {
            format!("📅 {} {}", self.name, "(primary)".dimmed())
        } else {
            format!("📅 {}", self.name)
        }
    }
}

impl Render for FullBackupPlan {
    fn render(&self) -> String {
        format!(
            "{}\n   {} {}\n   {} ~{} {}",
            self.calendar.render(),
            "Range:".dimmed(),
            self.range,
            "Estimate:".dimmed(),
            self.estimate,
            pluralize("event", self.estimate as usize)
        )
    }
}

impl Render for BackupReport {
    fn render(&self) -> String {
        let action = match self.mode {
            BackupMode::Full => "Backed up",
            BackupMode::Incremental => "Refreshed",
        };
        let mut lines = vec![format!(
            "   {} {} {} {} to {} in {:.1}s",
            "✓".green(),
            action,
            self.event_count,
            pluralize("event", self.event_count),
            self.sheet_name.bold(),
            self.elapsed.as_secs_f64()
        )];

        if self.removed_rows > 0 {
            lines.push(
                format!(
                    "   replaced {} existing {}",
                    self.removed_rows,
                    pluralize("row", self.removed_rows)
                )
                .dimmed()
                .to_string(),
            );
        }

        if self.truncated {
            let from = self
                .stopped_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "the start".to_string());
            let hint = match self.mode {
                BackupMode::Full => "running the backup again starts over",
                BackupMode::Incremental => "the next daily run refreshes them",
            };
            lines.push(format!(
                "   {} Partial backup: events from {} on were not fetched, {}",
                "!".yellow(),
                from,
                hint
            ));
        }

        for failure in &self.failed_windows {
            lines.push(format!(
                "   {} {}: {}",
                "✗".red(),
                failure.window,
                failure.message.red()
            ));
        }

        lines.join("\n")
    }
}

impl Render for SelfCheck {
    fn render(&self) -> String {
        format!(
            "{} Found {} {}\n{} Default calendar: {}\n{}",
            "✓".green(),
            self.calendar_count,
            pluralize("calendar", self.calendar_count),
            "✓".green(),
            self.default_calendar.render(),
            self.report.render()
        )
    }
}

impl Render for DailySummary {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "Backed up {} {} to {} {}",
            self.total_events,
            pluralize("event", self.total_events),
            self.sheets.len(),
            pluralize("sheet", self.sheets.len())
        )];

        for sheet in &self.sheets {
            lines.push(format!("   {} {}", "✓".green(), sheet));
        }
        for (calendar_id, message) in &self.errors {
            lines.push(format!("   {} {}: {}", "✗".red(), calendar_id, message.red()));
        }
        if self.truncated {
            lines.push(format!(
                "   {} Time limit reached for at least one calendar",
                "!".yellow()
            ));
        }

        lines.join("\n")
    }
}

impl Render for MetadataEntry {
    fn render(&self) -> String {
        let last = self
            .last_backup_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        format!(
            "   {} {} {} {}",
            self.calendar_name,
            format!("({})", self.calendar_id).dimmed(),
            last,
            format!("{} {}", self.event_count, pluralize("event", self.event_count as usize))
                .dimmed()
        )
    }
}
