//! Read-only access to calendar events.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{CalSheetError, CalSheetResult};
use crate::event::{CalendarRef, EventRecord};
use crate::source::protocol::{DefaultCalendar, ListCalendars, ListEvents};
use crate::source::provider::Provider;

/// A read-only calendar event provider.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Events of `calendar_id` starting within `range`, in provider order.
    async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
    ) -> CalSheetResult<Vec<EventRecord>>;

    async fn list_calendars(&self) -> CalSheetResult<Vec<CalendarRef>>;

    async fn default_calendar_id(&self) -> CalSheetResult<String>;

    /// Look up one calendar by id.
    async fn calendar(&self, calendar_id: &str) -> CalSheetResult<CalendarRef> {
        self.list_calendars()
            .await?
            .into_iter()
            .find(|c| c.id == calendar_id)
            .ok_or_else(|| CalSheetError::CalendarNotFound(calendar_id.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// Provider configuration from the `[provider]` config table
/// (e.g., `provider = "google"` plus `google_account = "..."`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

/// [`EventSource`] backed by an external provider binary.
pub struct ProviderSource {
    remote: Remote,
    timeout: Duration,
}

impl ProviderSource {
    pub fn new(remote: Remote, timeout: Duration) -> Self {
        ProviderSource { remote, timeout }
    }

    pub fn provider(&self) -> &Provider {
        &self.remote.provider
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.remote.config)
    }
}

impl EventSource for ProviderSource {
    async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
    ) -> CalSheetResult<Vec<EventRecord>> {
        self.remote
            .provider
            .call(
                ListEvents {
                    remote_config: self.remote_config(),
                    calendar_id: calendar_id.to_string(),
                    from: range.from.to_rfc3339(),
                    to: range.to.to_rfc3339(),
                },
                self.timeout,
            )
            .await
    }

    async fn list_calendars(&self) -> CalSheetResult<Vec<CalendarRef>> {
        self.remote
            .provider
            .call(
                ListCalendars {
                    remote_config: self.remote_config(),
                },
                self.timeout,
            )
            .await
    }

    async fn default_calendar_id(&self) -> CalSheetResult<String> {
        self.remote
            .provider
            .call(
                DefaultCalendar {
                    remote_config: self.remote_config(),
                },
                self.timeout,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_from_toml() {
        let remote: Remote = toml::from_str(
            r#"
            provider = "google"
            google_account = "me@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(remote.provider.name(), "google");
        let params = serde_json::Map::from(&remote.config);
        assert_eq!(params["google_account"], "me@example.com");
        assert!(!params.contains_key("provider"));
    }
}
