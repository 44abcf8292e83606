//! Windowed event fetching under a wall-clock budget.
//!
//! A range is fetched one window at a time. Each window's events are handed
//! to a sink as soon as they arrive, so work done before the budget runs out
//! (or before the process dies) is already persisted.

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::date_range::DateRange;
use crate::error::CalSheetResult;
use crate::event::EventRecord;
use crate::source::EventSource;

/// A window whose fetch failed. The rest of the range was still attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFailure {
    pub window: DateRange,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// Events handed to the sink.
    pub event_count: usize,
    /// The budget ran out before every window was attempted.
    pub truncated: bool,
    /// Start of the first window that was not attempted, when truncated.
    pub stopped_at: Option<DateTime<Local>>,
    pub failed_windows: Vec<WindowFailure>,
}

pub struct BatchFetcher {
    window_days: i64,
    limit: Duration,
}

impl BatchFetcher {
    pub fn new(window_days: i64, limit: Duration) -> Self {
        BatchFetcher { window_days, limit }
    }

    pub fn from_config(config: &SyncConfig) -> CalSheetResult<Self> {
        Ok(Self::new(config.window_days, config.execution_limit()?))
    }

    fn budget_exceeded(&self, started: DateTime<Local>, now: DateTime<Local>) -> bool {
        // A clock that went backwards counts as no time spent.
        let elapsed = (now - started).to_std().unwrap_or_default();
        elapsed > self.limit
    }

    /// Fetch `range` of `calendar_id` window by window, in ascending order.
    ///
    /// `started` is when the surrounding operation began; the budget covers
    /// the whole operation, not only this call. A failing window is logged
    /// and skipped. An error from `sink` aborts the fetch.
    pub async fn fetch_range<S, C, F>(
        &self,
        source: &S,
        calendar_id: &str,
        range: &DateRange,
        clock: &C,
        started: DateTime<Local>,
        mut sink: F,
    ) -> CalSheetResult<FetchOutcome>
    where
        S: EventSource,
        C: Clock,
        F: FnMut(&[EventRecord]) -> CalSheetResult<()>,
    {
        let windows = range.windows(self.window_days);
        let mut outcome = FetchOutcome::default();

        for (index, window) in windows.iter().enumerate() {
            if self.budget_exceeded(started, clock.now()) {
                warn!(
                    calendar_id,
                    completed = index,
                    remaining = windows.len() - index,
                    event_count = outcome.event_count,
                    "execution limit reached, stopping early"
                );
                outcome.truncated = true;
                outcome.stopped_at = Some(window.from);
                break;
            }

            match source.list_events(calendar_id, window).await {
                Ok(events) => {
                    debug!(
                        calendar_id,
                        window_start = %window.from,
                        event_count = events.len(),
                        "fetched window"
                    );
                    if !events.is_empty() {
                        sink(&events)?;
                    }
                    outcome.event_count += events.len();
                }
                Err(e) => {
                    error!(
                        calendar_id,
                        window_start = %window.from,
                        window_end = %window.to,
                        error = %e,
                        "failed to fetch window, skipping"
                    );
                    outcome.failed_windows.push(WindowFailure {
                        window: *window,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, ScriptedSource, day, event_at};
    use chrono::Duration as ChronoDuration;

    fn five_windows() -> DateRange {
        let start = day(2025, 1, 1);
        DateRange::new(start, start + ChronoDuration::days(150))
    }

    fn source_with_event_per_window(clock: &ManualClock) -> ScriptedSource {
        let start = day(2025, 1, 1);
        let mut source = ScriptedSource::new().with_calendar("work", "Work", true);
        for i in 0..5 {
            source = source.with_event("work", event_at(&format!("e{i}"), start + ChronoDuration::days(30 * i + 1)));
        }
        source.advancing(clock.clone(), ChronoDuration::seconds(100))
    }

    #[tokio::test]
    async fn test_fetches_every_window_in_order() {
        let clock = ManualClock::new(day(2025, 1, 1));
        let source = source_with_event_per_window(&clock);
        let fetcher = BatchFetcher::new(30, Duration::from_secs(3600));

        let mut titles = Vec::new();
        let outcome = fetcher
            .fetch_range(&source, "work", &five_windows(), &clock, clock.now(), |events| {
                titles.extend(events.iter().map(|e| e.title.clone()));
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(outcome.event_count, 5);
        assert!(!outcome.truncated);
        assert_eq!(outcome.stopped_at, None);
        assert!(outcome.failed_windows.is_empty());
        assert_eq!(titles, vec!["e0", "e1", "e2", "e3", "e4"]);
        assert_eq!(source.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_budget_truncates_after_two_windows() {
        let clock = ManualClock::new(day(2025, 1, 1));
        let source = source_with_event_per_window(&clock);
        // Each call costs 100s: checks happen at 0s, 100s, 200s.
        let fetcher = BatchFetcher::new(30, Duration::from_secs(150));

        let mut received = 0;
        let outcome = fetcher
            .fetch_range(&source, "work", &five_windows(), &clock, clock.now(), |events| {
                received += events.len();
                Ok(())
            })
            .await
            .unwrap();

        assert!(outcome.truncated);
        assert_eq!(outcome.stopped_at, Some(day(2025, 3, 2)));
        assert_eq!(outcome.event_count, 2);
        assert_eq!(received, 2);
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_window_is_skipped() {
        let clock = ManualClock::new(day(2025, 1, 1));
        let source = source_with_event_per_window(&clock).failing_call(1);
        let fetcher = BatchFetcher::new(30, Duration::from_secs(3600));

        let outcome = fetcher
            .fetch_range(&source, "work", &five_windows(), &clock, clock.now(), |_| Ok(()))
            .await
            .unwrap();

        assert_eq!(outcome.event_count, 4);
        assert!(!outcome.truncated);
        assert_eq!(outcome.failed_windows.len(), 1);
        assert_eq!(outcome.failed_windows[0].window.from, day(2025, 1, 31));
    }

    #[tokio::test]
    async fn test_sink_error_aborts() {
        let clock = ManualClock::new(day(2025, 1, 1));
        let source = source_with_event_per_window(&clock);
        let fetcher = BatchFetcher::new(30, Duration::from_secs(3600));

        let result = fetcher
            .fetch_range(&source, "work", &five_windows(), &clock, clock.now(), |_| {
                Err(crate::error::CalSheetError::TableNotFound("gone".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_budget_already_spent() {
        let clock = ManualClock::new(day(2025, 1, 1));
        let source = ScriptedSource::new().with_calendar("work", "Work", true);
        let fetcher = BatchFetcher::new(30, Duration::from_secs(60));
        let started = clock.now() - ChronoDuration::minutes(5);

        let outcome = fetcher
            .fetch_range(&source, "work", &five_windows(), &clock, started, |_| Ok(()))
            .await
            .unwrap();

        assert!(outcome.truncated);
        assert_eq!(outcome.stopped_at, Some(day(2025, 1, 1)));
        assert!(source.calls().is_empty());
    }
}
