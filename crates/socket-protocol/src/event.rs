//! Caller-facing events and the payload shapes they are narrowed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::nullable;

/// The kind of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// A message was sent to a channel.
    Message,
    /// A message that mentions the app or bot.
    AppMention,
    /// A user-invoked slash command.
    SlashCommand,
    /// Any other Events API event type.
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::AppMention => "app_mention",
            Self::SlashCommand => "slash_command",
            Self::Other(s) => s,
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "message" => Self::Message,
            "app_mention" => Self::AppMention,
            "slash_command" => Self::SlashCommand,
            _ => Self::Other(s),
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_owned()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed event handed to the caller's handler.
///
/// Message-family fields are filled from `payload.event` of an
/// `events_api` envelope; the slash-command fields come from a flattened
/// `slash_commands` payload.
///
/// See <https://api.slack.com/apis/connections/events-api#event_type_structure>.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default, deserialize_with = "nullable")]
    pub subtype: String,
    #[serde(default, deserialize_with = "nullable")]
    pub channel: String,
    #[serde(rename = "user", default, deserialize_with = "user_ref")]
    pub user_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub client_msg_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub bot_id: String,
    #[serde(rename = "team", default, deserialize_with = "nullable")]
    pub team_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub ts: String,
    #[serde(default, deserialize_with = "nullable")]
    pub event_ts: String,
    #[serde(default, deserialize_with = "nullable")]
    pub channel_type: String,

    // ── slash commands ───────────────────────────────────────────────
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub app_id: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub response_url: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub trigger_id: String,
}

impl Event {
    pub fn is_message(&self) -> bool {
        self.event_type == EventType::Message
    }

    pub fn is_app_mention(&self) -> bool {
        self.event_type == EventType::AppMention
    }

    pub fn is_slash_command(&self) -> bool {
        self.event_type == EventType::SlashCommand
    }

    /// Whether a bot (possibly this one) authored the message.
    pub fn is_from_bot(&self) -> bool {
        !self.bot_id.is_empty() || self.subtype == "bot_message"
    }

    /// Message time parsed from `ts` (`"<seconds>.<micros>"`).
    pub fn time(&self) -> Option<DateTime<Utc>> {
        parse_ts(&self.ts)
    }
}

fn parse_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = format!("{frac:0<6}").get(..6)?.parse().ok()?;
    DateTime::from_timestamp(secs, micros * 1000)
}

/// `payload` of an `events_api` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsApiPayload {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub payload_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub event_id: String,
    pub event: Event,
    #[serde(default, deserialize_with = "nullable")]
    pub event_time: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub event_context: String,
    #[serde(default, deserialize_with = "nullable")]
    pub team_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub api_app_id: String,
}

/// `payload` of a `slash_commands` envelope (flattened form fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlashCommandPayload {
    #[serde(default, deserialize_with = "nullable")]
    pub command: String,
    #[serde(default, deserialize_with = "nullable")]
    pub text: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub user_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub response_url: String,
    #[serde(default, deserialize_with = "nullable")]
    pub trigger_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub team_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub channel_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub api_app_id: String,
}

impl From<SlashCommandPayload> for Event {
    fn from(p: SlashCommandPayload) -> Self {
        Event {
            event_type: EventType::SlashCommand,
            channel: p.channel_id,
            user_id: p.user_id,
            team_id: p.team_id,
            text: p.text,
            command: p.command,
            user_name: p.user_name,
            app_id: p.api_app_id,
            response_url: p.response_url,
            trigger_id: p.trigger_id,
            ..Default::default()
        }
    }
}

/// `user` is a plain id on message events but a full object on some
/// others (e.g. `user_change`); keep only the id.
fn user_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(id)) => id,
        Some(serde_json::Value::Object(obj)) => obj
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_owned(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_string_mapping() {
        assert_eq!(EventType::from("message".to_string()), EventType::Message);
        assert_eq!(EventType::from("app_mention".to_string()), EventType::AppMention);
        assert_eq!(
            EventType::from("channel_created".to_string()),
            EventType::Other("channel_created".into())
        );
        assert_eq!(String::from(EventType::SlashCommand), "slash_command");
    }

    #[test]
    fn user_object_keeps_id() {
        let event: Event = serde_json::from_str(
            r#"{"type":"user_change","user":{"id":"U9","name":"someone"}}"#,
        )
        .unwrap();
        assert_eq!(event.user_id, "U9");
    }

    #[test]
    fn bot_messages_are_flagged() {
        let event: Event = serde_json::from_str(
            r#"{"type":"message","subtype":"bot_message","bot_id":"B1","text":"beep"}"#,
        )
        .unwrap();
        assert!(event.is_from_bot());
        assert!(event.user_id.is_empty());
    }

    #[test]
    fn ts_parses_to_utc_time() {
        let event = Event {
            ts: "1355517523.000005".into(),
            ..Default::default()
        };
        let t = event.time().unwrap();
        assert_eq!(t.timestamp(), 1_355_517_523);
        assert_eq!(t.timestamp_subsec_micros(), 5);
        assert!(Event::default().time().is_none());
    }

    #[test]
    fn slash_command_maps_channel_and_app() {
        let event: Event = SlashCommandPayload {
            command: "/echo".into(),
            channel_id: "C7".into(),
            api_app_id: "A1".into(),
            trigger_id: "T.1".into(),
            ..Default::default()
        }
        .into();
        assert!(event.is_slash_command());
        assert_eq!(event.channel, "C7");
        assert_eq!(event.app_id, "A1");
        assert_eq!(event.trigger_id, "T.1");
    }

    #[test]
    fn null_command_fields_read_as_empty() {
        let event: Event = serde_json::from_str(
            r#"{"type":"message","channel":"C1","text":"hi","command":null,"user_name":null,"app_id":null,"response_url":null,"trigger_id":null}"#,
        )
        .unwrap();
        assert_eq!(event.text, "hi");
        assert!(event.command.is_empty());
        assert!(event.response_url.is_empty());
        assert!(event.trigger_id.is_empty());
    }
}
