//! Test doubles shared by the unit tests.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::clock::Clock;
use crate::date_range::{DateRange, local_midnight};
use crate::error::{CalSheetError, CalSheetResult};
use crate::event::{CalendarRef, EventRecord};
use crate::source::EventSource;

pub(crate) fn day(y: i32, m: u32, d: u32) -> DateTime<Local> {
    local_midnight(NaiveDate::from_ymd_opt(y, m, d).unwrap()).unwrap()
}

/// A one-hour event starting at `start`.
pub(crate) fn event_at(title: &str, start: DateTime<Local>) -> EventRecord {
    EventRecord {
        title: title.to_string(),
        start: start.fixed_offset(),
        end: (start + Duration::hours(1)).fixed_offset(),
        location: None,
        description: None,
        guest_emails: Vec::new(),
        created: start.fixed_offset(),
        external_id: format!("{title}@test"),
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub(crate) fn new(at: DateTime<Local>) -> Self {
        ManualClock {
            now: Arc::new(Mutex::new(at)),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap()
    }
}

/// In-memory event source with scripted failures and per-call latency.
pub(crate) struct ScriptedSource {
    calendars: Vec<CalendarRef>,
    events: Vec<(String, EventRecord)>,
    failing_calls: Vec<usize>,
    latency: Option<(ManualClock, Duration)>,
    calls: RefCell<Vec<DateRange>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        ScriptedSource {
            calendars: Vec::new(),
            events: Vec::new(),
            failing_calls: Vec::new(),
            latency: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_calendar(mut self, id: &str, name: &str, is_primary: bool) -> Self {
        self.calendars.push(CalendarRef {
            id: id.to_string(),
            name: name.to_string(),
            is_primary,
        });
        self
    }

    pub(crate) fn with_event(mut self, calendar_id: &str, event: EventRecord) -> Self {
        self.events.push((calendar_id.to_string(), event));
        self
    }

    /// Make the `n`th `list_events` call (0-based) fail.
    pub(crate) fn failing_call(mut self, n: usize) -> Self {
        self.failing_calls.push(n);
        self
    }

    /// Advance `clock` by `step` on every `list_events` call.
    pub(crate) fn advancing(mut self, clock: ManualClock, step: Duration) -> Self {
        self.latency = Some((clock, step));
        self
    }

    /// Windows requested so far.
    pub(crate) fn calls(&self) -> Vec<DateRange> {
        self.calls.borrow().clone()
    }
}

impl EventSource for ScriptedSource {
    async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
    ) -> CalSheetResult<Vec<EventRecord>> {
        let call = {
            let mut calls = self.calls.borrow_mut();
            calls.push(*range);
            calls.len() - 1
        };

        if let Some((clock, step)) = &self.latency {
            clock.advance(*step);
        }

        if self.failing_calls.contains(&call) {
            return Err(CalSheetError::Provider(format!("scripted failure on call {call}")));
        }

        Ok(self
            .events
            .iter()
            .filter(|(id, _)| id == calendar_id)
            .map(|(_, event)| event)
            .filter(|event| {
                let start = event.start.with_timezone(&Local);
                start >= range.from && start < range.to
            })
            .cloned()
            .collect())
    }

    async fn list_calendars(&self) -> CalSheetResult<Vec<CalendarRef>> {
        Ok(self.calendars.clone())
    }

    async fn default_calendar_id(&self) -> CalSheetResult<String> {
        self.calendars
            .iter()
            .find(|c| c.is_primary)
            .map(|c| c.id.clone())
            .ok_or_else(|| CalSheetError::Provider("no primary calendar".into()))
    }
}
