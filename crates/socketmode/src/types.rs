//! Error taxonomy for the Socket Mode client.

use sb_protocol::ProtocolError;

/// Failure to obtain or establish a socket.
///
/// Raised by the [`ConnectionOpener`](crate::opener::ConnectionOpener)
/// handshake and by [`SocketSession::dial`](crate::session::SocketSession::dial).
#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("app token is empty")]
    MissingToken,
    #[error("connections.open request failed: {0}")]
    Request(String),
    #[error("connections.open returned {status} ({reason})")]
    Status { status: u16, reason: String },
    #[error("connections.open response decode failed: {0}")]
    Decode(String),
    #[error("connections.open rejected: {0}")]
    Rejected(String),
    #[error("connections.open response has no url")]
    MissingUrl,
    #[error("dial error: {0}")]
    Dial(String),
}

/// Errors from the underlying socket primitives.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("socket is not connected")]
    NotConnected,
    #[error("socket closed: {0}")]
    Closed(String),
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("frame encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-level Socket Mode error.
#[derive(thiserror::Error, Debug)]
pub enum SocketModeError {
    #[error("config: {0}")]
    Config(String),
    /// Handshake or dial failed; fatal to the current attempt.
    #[error("connection: {0}")]
    Connection(#[from] ConnectError),
    /// Malformed frame or payload. Triggers a reconnect.
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),
    /// Reading from or closing the socket failed. Triggers a reconnect.
    #[error("session: {0}")]
    Session(#[source] SessionError),
    /// Sending the acknowledgment failed. Triggers a reconnect.
    #[error("acknowledge error: {0}")]
    Acknowledgment(#[source] SessionError),
    /// The caller's handler failed. Never triggers a reconnect.
    #[error("handler: {0}")]
    Handler(#[source] anyhow::Error),
    #[error("context done")]
    Cancelled,
    #[error("socket is not connected")]
    NotConnected,
    #[error("reconnect exhausted after {0} attempts")]
    ReconnectExhausted(u32),
}

impl SocketModeError {
    /// Whether the dispatcher recovers from this error with a reconnect.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Protocol(_) | Self::Session(_) | Self::Acknowledgment(_)
        )
    }
}
