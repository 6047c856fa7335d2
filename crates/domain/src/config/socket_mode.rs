use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Socket Mode connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketModeConfig {
    /// Handshake endpoint returning a one-time WebSocket URL.
    #[serde(default = "d_connections_open_url")]
    pub connections_open_url: String,
    /// Bounds the handshake request and the WebSocket dial.
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    /// Dump every inbound envelope at debug level.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for SocketModeConfig {
    fn default() -> Self {
        Self {
            connections_open_url: d_connections_open_url(),
            timeout_ms: 10_000,
            debug: false,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Back-off applied by the long-running receive loop when re-establishing
/// the session itself fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "d_1000")]
    pub initial_delay_ms: u64,
    #[serde(default = "d_60000")]
    pub max_delay_ms: u64,
    #[serde(default = "d_factor")]
    pub backoff_factor: f64,
    /// `0` means unlimited.
    #[serde(default)]
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 60_000,
            backoff_factor: 2.0,
            max_attempts: 0,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_connections_open_url() -> String {
    "https://slack.com/api/apps.connections.open".into()
}
fn d_10000() -> u64 {
    10_000
}
fn d_1000() -> u64 {
    1000
}
fn d_60000() -> u64 {
    60_000
}
fn d_factor() -> f64 {
    2.0
}
