//! Connection opener: trades the app-level token for a one-time socket URL.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::types::ConnectError;

/// Obtains a WebSocket URL valid for exactly one dial attempt.
///
/// No retry happens at this layer; the reconnection controller in
/// [`SocketModeClient`](crate::client::SocketModeClient) decides when to
/// call it again.
#[async_trait]
pub trait ConnectionOpener: Send + Sync {
    async fn open(&self, app_token: &str) -> Result<String, ConnectError>;
}

/// `POST apps.connections.open` with a bearer app token.
///
/// See <https://api.slack.com/methods/apps.connections.open>.
#[derive(Debug, Clone)]
pub struct AppsConnectionsOpen {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl AppsConnectionsOpen {
    pub const DEFAULT_ENDPOINT: &'static str = "https://slack.com/api/apps.connections.open";

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ConnectError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectError::Request(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ConnectionOpener for AppsConnectionsOpen {
    async fn open(&self, app_token: &str) -> Result<String, ConnectError> {
        if app_token.is_empty() {
            return Err(ConnectError::MissingToken);
        }

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(app_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| ConnectError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ConnectError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_owned(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| ConnectError::Request(e.to_string()))?;
        let parsed: ConnectionsOpenResponse = serde_json::from_str(&body)
            .map_err(|e| ConnectError::Decode(format!("{e}: {body}")))?;

        if !parsed.ok {
            return Err(ConnectError::Rejected(
                parsed.error.unwrap_or_else(|| "unknown".into()),
            ));
        }

        match parsed.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ConnectError::MissingUrl),
        }
    }
}
