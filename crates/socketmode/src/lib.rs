//! `sb-socketmode` — real-time Slack session manager over Socket Mode.
//!
//! The client trades an app-level token for a one-time WebSocket URL,
//! keeps one live socket, acknowledges every envelope that carries an
//! `envelope_id`, and hands typed [`Event`]s to a caller-supplied handler.
//!
//! # Session flow
//!
//! 1. `POST apps.connections.open` with the app token → one-time `wss://` URL
//! 2. Dial the URL; Slack sends `hello`
//! 3. Per call to [`SocketModeClient::receive_message`]:
//!    - wait for one frame, racing the caller's cancellation token
//!    - acknowledge `{"envelope_id": ...}` before looking at the payload
//!    - `events_api` / `slash_commands` → handler
//!    - `disconnect` → reconnect once, no event
//!    - malformed frame or failed ack → reconnect once, frame dropped
//! 4. [`SocketModeClient::run`] loops step 3 and backs off when the
//!    handshake or dial keeps failing
//!
//! ```text
//!   caller ──receive_message──▶ SocketSession ◀──dial── ConnectionOpener
//!                 │                   │
//!                 ▼                   ▼
//!              handler(Event)    ack {envelope_id}
//! ```

pub mod builder;
pub mod client;
pub mod opener;
pub mod reconnect;
pub mod session;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::SocketModeClientBuilder;
pub use client::SocketModeClient;
pub use opener::{AppsConnectionsOpen, ConnectionOpener};
pub use reconnect::ReconnectBackoff;
pub use session::SocketSession;
pub use types::{ConnectError, SessionError, SocketModeError};

pub use sb_protocol::{Acknowledge, Envelope, EnvelopeType, Event, EventType};
