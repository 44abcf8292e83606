//! The set of calendars under daily backup.

use tracing::info;

use crate::constants::CALENDAR_IDS_KEY;
use crate::error::{CalSheetError, CalSheetResult};
use crate::properties::PropertyStore;

/// Ordered, duplicate-free list of calendar ids, stored as a JSON array under
/// a single property key.
pub struct CalendarRegistry<'a, P: PropertyStore> {
    properties: &'a mut P,
}

impl<'a, P: PropertyStore> CalendarRegistry<'a, P> {
    pub fn new(properties: &'a mut P) -> Self {
        CalendarRegistry { properties }
    }

    pub fn list(&self) -> CalSheetResult<Vec<String>> {
        match self.properties.get(CALENDAR_IDS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                CalSheetError::Properties(format!("Invalid {CALENDAR_IDS_KEY} value: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Add `calendar_id` unless it is already registered.
    /// Returns true if it was added.
    pub fn register(&mut self, calendar_id: &str) -> CalSheetResult<bool> {
        let mut ids = self.list()?;
        if ids.iter().any(|id| id == calendar_id) {
            return Ok(false);
        }

        ids.push(calendar_id.to_string());
        self.properties
            .set(CALENDAR_IDS_KEY, &serde_json::to_string(&ids)?)?;
        info!(calendar_id, "registered calendar for daily backup");
        Ok(true)
    }

    /// Forget every registered calendar. Tables and metadata are untouched.
    pub fn clear(&mut self) -> CalSheetResult<()> {
        self.properties.delete(CALENDAR_IDS_KEY)
    }
}
