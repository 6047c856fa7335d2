use serde::Serialize;

/// Structured trace events emitted across all slackbot crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SocketOpened {
        duration_ms: u64,
    },
    EnvelopeAcknowledged {
        envelope_id: String,
        envelope_type: String,
        retry_attempt: i64,
    },
    Reconnected {
        reason: String,
        duration_ms: u64,
    },
    WebApiCall {
        method: String,
        status: u16,
        duration_ms: u64,
    },
    UsersCached {
        count: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "sb_event");
    }
}
