//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `calsheet-provider-google`) using JSON over stdin/stdout.
//!
//! Any executable that speaks the JSON protocol can be a provider.
//! Providers manage their own credentials and tokens; calsheet only passes
//! provider-specific parameters from the config.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{CalSheetError, CalSheetResult};
use crate::source::protocol::{Command, ProviderCommand, Request, Response};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("calsheet-provider-{}", self.0)
    }

    fn binary_path(&self) -> CalSheetResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| CalSheetError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(
        &self,
        cmd: C,
        limit: Duration,
    ) -> CalSheetResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| CalSheetError::ProviderTimeout(limit.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> CalSheetResult<R> {
        let params = serde_json::to_value(params)?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)?;

        let binary_path = self.binary_path()?;
        debug!(provider = %self.0, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CalSheetError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CalSheetError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(CalSheetError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(CalSheetError::Provider("Provider returned no response".into()));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| CalSheetError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(CalSheetError::Provider(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::protocol::DefaultCalendar;

    #[test]
    fn test_binary_name() {
        assert_eq!(
            Provider::from_name("google").binary_name(),
            "calsheet-provider-google"
        );
    }

    #[tokio::test]
    async fn test_missing_provider_binary() {
        let provider = Provider::from_name("definitely-not-installed-xyz");
        let result = provider
            .call(
                DefaultCalendar {
                    remote_config: serde_json::Map::new(),
                },
                Duration::from_secs(5),
            )
            .await;
        assert!(matches!(result, Err(CalSheetError::ProviderNotInstalled(_))));
    }
}
