//! Full and incremental backups.
//!
//! A full backup clears a calendar's table and fetches everything from the
//! configured start date until `backup_months_future` months from now. An
//! incremental backup leaves rows before today alone, deletes rows from today
//! onward and fetches today onward again.
//!
//! Rows are never deduplicated. Correctness relies on clearing (or deleting)
//! before fetching, so two fetches of overlapping ranges into the same table
//! produce duplicate rows.

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{error, info, instrument, warn};

use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::date_range::{DateRange, start_of_day};
use crate::error::{CalSheetError, CalSheetResult};
use crate::event::{CalendarRef, EventRecord};
use crate::fetch::{BatchFetcher, FetchOutcome, WindowFailure};
use crate::metadata::MetadataTracker;
use crate::properties::PropertyStore;
use crate::registry::CalendarRegistry;
use crate::source::EventSource;
use crate::store::layout::{EVENT_COLUMNS, START_TIME_COLUMN};
use crate::store::{Row, TableHandle, TableLayout, TableStore, sheet_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    Full,
    Incremental,
}

/// A resolved full backup, ready to run once the caller has decided that the
/// estimate is acceptable.
#[derive(Debug, Clone)]
pub struct FullBackupPlan {
    pub calendar: CalendarRef,
    pub range: DateRange,
    pub estimate: u64,
    /// The estimate is above the configured threshold.
    pub requires_confirmation: bool,
}

#[derive(Debug, Clone)]
pub struct BackupReport {
    pub mode: BackupMode,
    pub calendar: CalendarRef,
    pub sheet_name: String,
    pub event_count: usize,
    pub truncated: bool,
    /// Start of the part of the range that was not fetched, when truncated.
    pub stopped_at: Option<DateTime<Local>>,
    /// Rows removed before fetching (cleared rows for a full backup).
    pub removed_rows: usize,
    pub failed_windows: Vec<WindowFailure>,
    pub elapsed: Duration,
}

/// Result of one pass over the registry.
#[derive(Debug, Clone, Default)]
pub struct DailySummary {
    pub total_events: usize,
    /// Sheets that were refreshed.
    pub sheets: Vec<String>,
    /// `(calendar id, message)` for calendars that failed.
    pub errors: Vec<(String, String)>,
    pub truncated: bool,
}

impl DailySummary {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of [`SyncPolicy::self_check`].
#[derive(Debug, Clone)]
pub struct SelfCheck {
    pub calendar_count: usize,
    pub default_calendar: CalendarRef,
    pub report: BackupReport,
}

pub struct SyncPolicy<S, T, P, C> {
    config: SyncConfig,
    fetcher: BatchFetcher,
    tracker: MetadataTracker,
    source: S,
    store: T,
    properties: P,
    clock: C,
}

impl<S, T, P, C> SyncPolicy<S, T, P, C>
where
    S: EventSource,
    T: TableStore,
    P: PropertyStore,
    C: Clock,
{
    pub fn new(
        config: SyncConfig,
        source: S,
        store: T,
        properties: P,
        clock: C,
    ) -> CalSheetResult<Self> {
        config.validate()?;
        Ok(SyncPolicy {
            fetcher: BatchFetcher::from_config(&config)?,
            tracker: MetadataTracker::new(&config),
            config,
            source,
            store,
            properties,
            clock,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn registry(&mut self) -> CalendarRegistry<'_, P> {
        CalendarRegistry::new(&mut self.properties)
    }

    fn elapsed_since(&self, started: DateTime<Local>) -> Duration {
        (self.clock.now() - started).to_std().unwrap_or_default()
    }

    /// Table name for `calendar`.
    pub fn sheet_name(&self, calendar: &CalendarRef) -> String {
        sheet_name(&self.config.sheet_prefix, &calendar.name)
    }

    /// Estimate how many events `range` holds by sampling its first
    /// `estimate_sample_days` days and extrapolating linearly.
    ///
    /// A failing sample yields 0.
    pub async fn estimate(&self, calendar_id: &str, range: &DateRange) -> u64 {
        let sample_days = self.config.estimate_sample_days;
        let sample = range.head(sample_days);

        match self.source.list_events(calendar_id, &sample).await {
            Ok(events) => {
                let span_days = range.span_days().max(0) as u64;
                let estimate = events.len() as u64 * span_days / sample_days as u64;
                info!(calendar_id, sampled = events.len(), estimate, "estimated event volume");
                estimate
            }
            Err(e) => {
                warn!(calendar_id, error = %e, "could not sample events for estimate");
                0
            }
        }
    }

    /// Range of a full backup started now.
    pub fn full_backup_range(&self) -> CalSheetResult<DateRange> {
        DateRange::until_months_after(
            self.config.full_backup_start()?,
            self.clock.now(),
            self.config.backup_months_future,
        )
    }

    /// Resolve the calendar and estimate the volume of a full backup.
    /// Nothing is written.
    pub async fn prepare_full(&self, calendar_id: &str) -> CalSheetResult<FullBackupPlan> {
        let calendar = self.source.calendar(calendar_id).await?;
        let range = self.full_backup_range()?;
        let estimate = self.estimate(calendar_id, &range).await;

        Ok(FullBackupPlan {
            requires_confirmation: estimate > self.config.estimate_threshold,
            calendar,
            range,
            estimate,
        })
    }

    /// Clear the calendar's table and fetch the plan's whole range into it.
    /// On success the calendar is registered for daily backups.
    #[instrument(skip_all, fields(calendar_id = %plan.calendar.id))]
    pub async fn execute_full(&mut self, plan: &FullBackupPlan) -> CalSheetResult<BackupReport> {
        let started = self.clock.now();
        let name = self.sheet_name(&plan.calendar);
        let table = self.store.get_or_create_table(&TableLayout::events(&name))?;

        let last_row = self.store.last_row(&table)?;
        let removed_rows = last_row.saturating_sub(1);
        if removed_rows > 0 {
            self.store
                .clear_range(&table, 2, removed_rows, EVENT_COLUMNS)?;
            info!(sheet = %name, rows = removed_rows, "cleared existing rows");
        }

        info!(sheet = %name, range = %plan.range, "starting full backup");
        let outcome = self.fetch_into(&plan.calendar.id, &plan.range, &table, started).await?;

        if let Err(e) = self.registry().register(&plan.calendar.id) {
            error!(error = %e, "failed to register calendar");
        }
        self.record_metadata(&plan.calendar, outcome.event_count);

        Ok(self.report(BackupMode::Full, plan.calendar.clone(), name, removed_rows, outcome, started))
    }

    /// Full backup without the confirmation step.
    pub async fn full_backup(&mut self, calendar_id: &str) -> CalSheetResult<BackupReport> {
        let plan = self.prepare_full(calendar_id).await?;
        self.execute_full(&plan).await
    }

    /// Replace the rows from today onward with freshly fetched events.
    #[instrument(skip(self))]
    pub async fn backup_incremental(&mut self, calendar_id: &str) -> CalSheetResult<BackupReport> {
        let started = self.clock.now();
        let calendar = self.source.calendar(calendar_id).await?;

        let today = start_of_day(started)?;
        let range = DateRange::until_months_after(today, started, self.config.backup_months_future)?;

        let name = self.sheet_name(&calendar);
        let table = self.store.get_or_create_table(&TableLayout::events(&name))?;

        let stale = self.rows_from(&table, today)?;
        if !stale.is_empty() {
            self.store.delete_rows(&table, &stale)?;
            info!(sheet = %name, rows = stale.len(), "deleted rows from today onward");
        }

        let outcome = self.fetch_into(&calendar.id, &range, &table, started).await?;
        self.record_metadata(&calendar, outcome.event_count);

        Ok(self.report(BackupMode::Incremental, calendar, name, stale.len(), outcome, started))
    }

    /// Rows (1-based, header excluded) whose start time is at or after
    /// `since`, top to bottom. Rows without a readable start time are kept.
    fn rows_from(&self, table: &TableHandle, since: DateTime<Local>) -> CalSheetResult<Vec<usize>> {
        let last_row = self.store.last_row(table)?;
        if last_row < 2 {
            return Ok(Vec::new());
        }

        let rows = self.store.read_range(table, 2, last_row - 1, EVENT_COLUMNS)?;
        Ok(rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.get(START_TIME_COLUMN)
                    .and_then(|cell| cell.as_datetime())
                    .is_some_and(|start| start.with_timezone(&Local) >= since)
            })
            .map(|(offset, _)| offset + 2)
            .collect())
    }

    async fn fetch_into(
        &mut self,
        calendar_id: &str,
        range: &DateRange,
        table: &TableHandle,
        started: DateTime<Local>,
    ) -> CalSheetResult<FetchOutcome> {
        let store = &mut self.store;
        self.fetcher
            .fetch_range(&self.source, calendar_id, range, &self.clock, started, |events| {
                let rows: Vec<Row> = events.iter().map(EventRecord::to_row).collect();
                store.append_rows(table, &rows)
            })
            .await
    }

    fn record_metadata(&mut self, calendar: &CalendarRef, event_count: usize) {
        let now = self.clock.now();
        if let Err(e) = self
            .tracker
            .record_backup(&mut self.store, calendar, event_count, now)
        {
            error!(calendar_id = %calendar.id, error = %e, "failed to update backup metadata");
        }
    }

    fn report(
        &self,
        mode: BackupMode,
        calendar: CalendarRef,
        sheet_name: String,
        removed_rows: usize,
        outcome: FetchOutcome,
        started: DateTime<Local>,
    ) -> BackupReport {
        let report = BackupReport {
            mode,
            calendar,
            sheet_name,
            event_count: outcome.event_count,
            truncated: outcome.truncated,
            stopped_at: outcome.stopped_at,
            removed_rows,
            failed_windows: outcome.failed_windows,
            elapsed: self.elapsed_since(started),
        };
        info!(
            sheet = %report.sheet_name,
            event_count = report.event_count,
            truncated = report.truncated,
            failed_windows = report.failed_windows.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "backup finished"
        );
        report
    }

    /// Incremental backup of every registered calendar. A failing calendar
    /// is recorded in the summary and the rest still run.
    #[instrument(skip(self))]
    pub async fn run_daily(&mut self) -> CalSheetResult<DailySummary> {
        let ids = self.registry().list()?;
        let mut summary = DailySummary::default();

        if ids.is_empty() {
            warn!("no calendars registered for daily backup");
            return Ok(summary);
        }

        for id in ids {
            match self.backup_incremental(&id).await {
                Ok(report) => {
                    summary.total_events += report.event_count;
                    summary.truncated |= report.truncated;
                    summary.sheets.push(report.sheet_name);
                }
                Err(e) => {
                    error!(calendar_id = %id, error = %e, "daily backup failed");
                    summary.errors.push((id, e.to_string()));
                }
            }
        }

        info!(
            total_events = summary.total_events,
            sheets = summary.sheets.len(),
            errors = summary.errors.len(),
            "daily backup finished"
        );
        Ok(summary)
    }

    /// Walk the whole backup path once: list calendars, resolve the
    /// provider's default calendar and refresh its table incrementally.
    /// The calendar is not registered.
    #[instrument(skip(self))]
    pub async fn self_check(&mut self) -> CalSheetResult<SelfCheck> {
        let calendars = self.source.list_calendars().await?;
        let calendar_count = calendars.len();
        info!(count = calendar_count, "listed calendars");

        let default_id = self.source.default_calendar_id().await?;
        let default_calendar = calendars
            .into_iter()
            .find(|c| c.id == default_id)
            .ok_or_else(|| CalSheetError::CalendarNotFound(default_id.clone()))?;
        info!(calendar_id = %default_id, "resolved default calendar");

        let report = self.backup_incremental(&default_id).await?;
        Ok(SelfCheck {
            calendar_count,
            default_calendar,
            report,
        })
    }

    /// Delete every table except the metadata table and blank its entries.
    /// Returns the number of deleted tables.
    ///
    /// Entries are cleared first, so a metadata table without its marker row
    /// fails the reset before any table is deleted.
    pub fn reset_workbook(&mut self) -> CalSheetResult<usize> {
        self.tracker.clear_entries(&mut self.store)?;

        let mut deleted = 0;
        for name in self.store.table_names() {
            if name == self.tracker.table_name() {
                continue;
            }
            self.store.delete_table(&TableHandle::new(&name))?;
            deleted += 1;
        }
        info!(deleted, "workbook reset");
        Ok(deleted)
    }
}
