//! Wall-clock access.

use chrono::{DateTime, Local};

/// Source of the current local time. Used both for date arithmetic and for
/// measuring the execution budget.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
