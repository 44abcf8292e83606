//! Defines the JSON protocol used for communication between calsheet
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{CalendarRef, EventRecord};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListCalendars,
    ListEvents,
    DefaultCalendar,
}

/// Request sent from calsheet to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to calsheet.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// List every calendar the configured account can read.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListCalendars {
    /// Provider-specific config (e.g., google_account)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for ListCalendars {
    type Response = Vec<CalendarRef>;
    fn command() -> Command {
        Command::ListCalendars
    }
}

/// List events of one calendar starting within `[from, to)`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub calendar_id: String,
    /// RFC 3339, inclusive
    pub from: String,
    /// RFC 3339, exclusive
    pub to: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<EventRecord>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Id of the account's default calendar.
#[derive(Debug, Serialize, Deserialize)]
pub struct DefaultCalendar {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for DefaultCalendar {
    type Response = String;
    fn command() -> Command {
        Command::DefaultCalendar
    }
}
