//! Socket Mode protocol: inbound envelopes, outbound acknowledgments, and
//! narrowing of envelope payloads into typed [`Event`]s.
//!
//! Every frame Slack pushes over the socket is a JSON [`Envelope`] with a
//! `type` tag.  Decoding is single-pass: text → [`Envelope`] →
//! [`Resolved`] via [`Envelope::narrow`].  Unknown tags are not errors;
//! they resolve to [`Resolved::Skip`] so new protocol additions never
//! break a receive loop.

mod event;

pub use event::{Event, EventType, EventsApiPayload, SlashCommandPayload};

use serde::{Deserialize, Deserializer, Serialize};

/// An inbound Socket Mode frame.
///
/// `payload` is kept opaque until [`narrow`](Envelope::narrow) is called,
/// because its shape depends on the envelope type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub envelope_type: String,
    /// Correlation id; must be acknowledged when non-empty.
    #[serde(default, deserialize_with = "nullable")]
    pub envelope_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, deserialize_with = "nullable")]
    pub accepts_response_payload: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub retry_attempt: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub retry_reason: String,
    /// Only set on `disconnect` frames (e.g. `refresh_requested`).
    #[serde(default, deserialize_with = "nullable")]
    pub reason: String,
    #[serde(default)]
    pub debug_info: serde_json::Value,
}

/// Known envelope type tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeType {
    EventsApi,
    SlashCommands,
    Interactive,
    Disconnect,
    Hello,
    Other(String),
}

impl EnvelopeType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "events_api" => Self::EventsApi,
            "slash_commands" => Self::SlashCommands,
            "interactive" => Self::Interactive,
            "disconnect" => Self::Disconnect,
            "hello" => Self::Hello,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::EventsApi => "events_api",
            Self::SlashCommands => "slash_commands",
            Self::Interactive => "interactive",
            Self::Disconnect => "disconnect",
            Self::Hello => "hello",
            Self::Other(tag) => tag,
        }
    }
}

impl std::fmt::Display for EnvelopeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of narrowing an envelope's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A caller-facing event.
    Event(Event),
    /// The server asked us to reconnect.
    Disconnect { reason: String },
    /// Connection confirmed live; informational only.
    Hello,
    /// An envelope type this client does not handle.
    Skip(EnvelopeType),
}

/// Errors raised while decoding a frame or narrowing its payload.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("{0} envelope has no payload")]
    MissingPayload(EnvelopeType),

    #[error("malformed {envelope_type} payload: {source}")]
    Payload {
        envelope_type: EnvelopeType,
        #[source]
        source: serde_json::Error,
    },
}

/// Outbound acknowledgment for an envelope bearing an `envelope_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledge {
    pub envelope_id: String,
}

impl Acknowledge {
    pub fn new(envelope_id: impl Into<String>) -> Self {
        Self {
            envelope_id: envelope_id.into(),
        }
    }
}

/// Decode one text frame into an [`Envelope`].
pub fn decode(text: &str) -> Result<Envelope, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Envelope)
}

impl Envelope {
    pub fn kind(&self) -> EnvelopeType {
        EnvelopeType::parse(&self.envelope_type)
    }

    /// The acknowledgment owed for this envelope, if any.
    pub fn acknowledgment(&self) -> Option<Acknowledge> {
        if self.envelope_id.is_empty() {
            None
        } else {
            Some(Acknowledge::new(self.envelope_id.clone()))
        }
    }

    /// Narrow the opaque payload according to the type tag.
    pub fn narrow(&self) -> Result<Resolved, ProtocolError> {
        let kind = self.kind();
        match kind {
            EnvelopeType::EventsApi => {
                let payload: EventsApiPayload = self.typed_payload(&kind)?;
                Ok(Resolved::Event(payload.event))
            }
            EnvelopeType::SlashCommands => {
                let payload: SlashCommandPayload = self.typed_payload(&kind)?;
                Ok(Resolved::Event(payload.into()))
            }
            EnvelopeType::Disconnect => Ok(Resolved::Disconnect {
                reason: self.reason.clone(),
            }),
            EnvelopeType::Hello => Ok(Resolved::Hello),
            other => Ok(Resolved::Skip(other)),
        }
    }

    fn typed_payload<T: serde::de::DeserializeOwned>(
        &self,
        kind: &EnvelopeType,
    ) -> Result<T, ProtocolError> {
        if self.payload.is_null() {
            return Err(ProtocolError::MissingPayload(kind.clone()));
        }
        T::deserialize(&self.payload).map_err(|source| ProtocolError::Payload {
            envelope_type: kind.clone(),
            source,
        })
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
