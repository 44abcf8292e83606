//! Daily trigger state.
//!
//! The trigger is just the hour of the daily run, persisted in the property
//! store. Whatever drives the schedule reads it back and calls the daily entry
//! point once it is time.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use tracing::info;

use crate::constants::DAILY_TRIGGER_KEY;
use crate::error::{CalSheetError, CalSheetResult};
use crate::properties::PropertyStore;

pub struct DailyTrigger<'a, P: PropertyStore> {
    properties: &'a mut P,
}

impl<'a, P: PropertyStore> DailyTrigger<'a, P> {
    pub fn new(properties: &'a mut P) -> Self {
        DailyTrigger { properties }
    }

    /// Hour of the enabled trigger, if any.
    pub fn hour(&self) -> CalSheetResult<Option<u32>> {
        match self.properties.get(DAILY_TRIGGER_KEY)? {
            Some(raw) => raw.trim().parse::<u32>().map(Some).map_err(|_| {
                CalSheetError::Properties(format!("Invalid {DAILY_TRIGGER_KEY} value '{raw}'"))
            }),
            None => Ok(None),
        }
    }

    /// Enable the trigger at `hour`, replacing any existing one.
    pub fn enable(&mut self, hour: u32) -> CalSheetResult<()> {
        if hour > 23 {
            return Err(CalSheetError::Config(format!(
                "Trigger hour must be between 0 and 23, got {hour}"
            )));
        }
        self.properties.set(DAILY_TRIGGER_KEY, &hour.to_string())?;
        info!(hour, "daily trigger enabled");
        Ok(())
    }

    /// Remove the trigger. Returns whether one existed.
    pub fn disable(&mut self) -> CalSheetResult<bool> {
        let existed = self.properties.get(DAILY_TRIGGER_KEY)?.is_some();
        if existed {
            self.properties.delete(DAILY_TRIGGER_KEY)?;
            info!("daily trigger disabled");
        }
        Ok(existed)
    }
}

/// The next time strictly after `now` at which the local clock reads
/// `hour`:00.
pub fn next_run_after(now: DateTime<Local>, hour: u32) -> CalSheetResult<DateTime<Local>> {
    let today = now.date_naive();
    let candidate = at_hour(today, hour)?;
    if candidate > now {
        return Ok(candidate);
    }

    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| CalSheetError::Config(format!("No day after {today}")))?;
    at_hour(tomorrow, hour)
}

fn at_hour(date: NaiveDate, hour: u32) -> CalSheetResult<DateTime<Local>> {
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| CalSheetError::Config(format!("Invalid hour {hour}")))?;
    // An hour skipped by a DST jump runs at the first instant after it.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .ok_or_else(|| CalSheetError::Config(format!("No local {hour}:00 on {date}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::MemoryProperties;

    #[test]
    fn test_enable_replaces_existing_trigger() {
        let mut props = MemoryProperties::new();
        let mut trigger = DailyTrigger::new(&mut props);
        assert_eq!(trigger.hour().unwrap(), None);

        trigger.enable(5).unwrap();
        trigger.enable(7).unwrap();
        assert_eq!(trigger.hour().unwrap(), Some(7));
    }

    #[test]
    fn test_disable_reports_existing() {
        let mut props = MemoryProperties::new();
        let mut trigger = DailyTrigger::new(&mut props);
        assert!(!trigger.disable().unwrap());

        trigger.enable(5).unwrap();
        assert!(trigger.disable().unwrap());
        assert_eq!(trigger.hour().unwrap(), None);
    }

    #[test]
    fn test_enable_rejects_bad_hour() {
        let mut props = MemoryProperties::new();
        assert!(DailyTrigger::new(&mut props).enable(24).is_err());
    }

    #[test]
    fn test_next_run_later_today() {
        let now = Local.with_ymd_and_hms(2025, 6, 15, 3, 30, 0).unwrap();
        assert_eq!(
            next_run_after(now, 5).unwrap(),
            Local.with_ymd_and_hms(2025, 6, 15, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_run_tomorrow() {
        let now = Local.with_ymd_and_hms(2025, 6, 15, 5, 0, 0).unwrap();
        assert_eq!(
            next_run_after(now, 5).unwrap(),
            Local.with_ymd_and_hms(2025, 6, 16, 5, 0, 0).unwrap()
        );
    }
}
