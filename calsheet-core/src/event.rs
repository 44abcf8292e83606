//! Provider-neutral calendar and event types.
//!
//! Providers convert their API responses into these types; the sync engine
//! only ever works with them.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::store::{Cell, Row};

/// A calendar the provider can read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl fmt::Display for CalendarRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single calendar event, as stored in one table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Guest email addresses in provider order
    #[serde(default)]
    pub guest_emails: Vec<String>,
    pub created: DateTime<FixedOffset>,
    /// Provider's event identifier. Displayed only, never used to dedup rows.
    pub external_id: String,
}

impl EventRecord {
    /// Row in calendar table column order:
    /// title, start, end, location, description, guests, created, id.
    pub fn to_row(&self) -> Row {
        vec![
            Cell::from(self.title.clone()),
            Cell::from(self.start),
            Cell::from(self.end),
            Cell::from(self.location.clone()),
            Cell::from(self.description.clone()),
            Cell::from(self.guest_emails.join(", ")),
            Cell::from(self.created),
            Cell::from(self.external_id.clone()),
        ]
    }
}
