//! Builder pattern for constructing a [`SocketModeClient`].

use std::sync::Arc;
use std::time::Duration;

use sb_domain::config::SocketModeConfig;

use crate::client::SocketModeClient;
use crate::opener::{AppsConnectionsOpen, ConnectionOpener};
use crate::reconnect::ReconnectBackoff;
use crate::session::SocketSession;
use crate::types::SocketModeError;

/// Fluent builder for [`SocketModeClient`].
///
/// # Example
///
/// ```rust,no_run
/// # use sb_socketmode::SocketModeClientBuilder;
/// # async fn demo() -> Result<(), sb_socketmode::SocketModeError> {
/// let client = SocketModeClientBuilder::new()
///     .app_token(std::env::var("SLACK_APP_TOKEN").unwrap_or_default())
///     .timeout(std::time::Duration::from_secs(5))
///     .debug(true)
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SocketModeClientBuilder {
    app_token: String,
    timeout: Duration,
    debug: bool,
    connections_open_url: String,
    reconnect_backoff: ReconnectBackoff,
    opener: Option<Arc<dyn ConnectionOpener>>,
}

impl SocketModeClientBuilder {
    pub fn new() -> Self {
        Self {
            app_token: String::new(),
            timeout: Duration::from_secs(10),
            debug: false,
            connections_open_url: AppsConnectionsOpen::DEFAULT_ENDPOINT.into(),
            reconnect_backoff: ReconnectBackoff::default(),
            opener: None,
        }
    }

    /// Seed every setting except the token from a `[socket_mode]` section.
    pub fn from_config(cfg: &SocketModeConfig) -> Self {
        Self::new()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .debug(cfg.debug)
            .connections_open_url(cfg.connections_open_url.clone())
            .reconnect_backoff(ReconnectBackoff::from(&cfg.reconnect))
    }

    /// Set the app-level token (`xapp-…`).
    pub fn app_token(mut self, token: impl Into<String>) -> Self {
        self.app_token = token.into();
        self
    }

    /// Bound for the handshake request and the WebSocket dial (default 10s).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Dump every inbound envelope.
    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn connections_open_url(mut self, url: impl Into<String>) -> Self {
        self.connections_open_url = url.into();
        self
    }

    /// Override the back-off used by [`SocketModeClient::run`].
    pub fn reconnect_backoff(mut self, policy: ReconnectBackoff) -> Self {
        self.reconnect_backoff = policy;
        self
    }

    /// Replace the `apps.connections.open` handshake entirely.
    pub fn opener(mut self, opener: Arc<dyn ConnectionOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Build a client without connecting.
    pub fn build(self) -> Result<SocketModeClient, SocketModeError> {
        if self.app_token.is_empty() {
            return Err(SocketModeError::Config("app token is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(SocketModeError::Config("timeout must be non-zero".into()));
        }

        let opener = match self.opener {
            Some(opener) => opener,
            None => Arc::new(AppsConnectionsOpen::new(
                self.connections_open_url,
                self.timeout,
            )?),
        };

        Ok(SocketModeClient {
            app_token: self.app_token,
            timeout: self.timeout,
            debug: self.debug,
            reconnect_backoff: self.reconnect_backoff,
            opener,
            session: SocketSession::new(self.timeout),
        })
    }

    /// Build the client and establish the first session.
    pub async fn connect(self) -> Result<SocketModeClient, SocketModeError> {
        let client = self.build()?;
        client.connect().await?;
        Ok(client)
    }
}

impl Default for SocketModeClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_a_config_error() {
        let err = SocketModeClientBuilder::new().build().err().unwrap();
        assert!(matches!(err, SocketModeError::Config(_)));
    }

    #[test]
    fn config_section_carries_over() {
        let cfg = SocketModeConfig {
            timeout_ms: 2_500,
            debug: true,
            ..Default::default()
        };
        let client = SocketModeClientBuilder::from_config(&cfg)
            .app_token("xapp-1")
            .build()
            .unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(2_500));
        assert!(client.debug);
        assert!(!client.is_connected());
    }
}
