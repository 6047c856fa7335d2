//! Wire types for the Web API methods this crate calls.
//!
//! Every Web API reply carries `ok` plus, on failure, `error` (and for
//! `missing_scope`, the `needed` / `provided` scopes).  That status block
//! is decoded separately by [`ResponseStatus`] so the method-specific
//! structs below only describe the success body.

use serde::{Deserialize, Serialize};

use sb_domain::error::Error;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Common status block
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub needed: Option<String>,
    #[serde(default)]
    pub provided: Option<String>,
}

impl ResponseStatus {
    /// Turn an `ok: false` reply into [`Error::SlackApi`].
    pub fn into_result(self, method: &str) -> Result<(), Error> {
        if self.ok {
            return Ok(());
        }
        let code = self.error.unwrap_or_else(|| "unknown_error".into());
        let message = if code == "missing_scope" {
            format!(
                "{code}: needed: {:?}, provided: {:?}",
                self.needed.unwrap_or_default(),
                self.provided.unwrap_or_default()
            )
        } else {
            code
        };
        Err(Error::SlackApi {
            method: method.to_owned(),
            message,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// chat.postMessage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Response body of `chat.postMessage`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub message: Message,
}

/// A posted message as echoed back by Slack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "type", default)]
    pub message_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtype: String,
    #[serde(default)]
    pub ts: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub fallback: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// users.list
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Response body of `users.list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersListResponse {
    #[serde(default)]
    pub members: Vec<User>,
}

/// A workspace member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub deleted: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// files.upload
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An image to share through `files.upload`.
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub channels: Vec<String>,
    pub title: String,
    pub file_name: String,
    /// Slack file type, e.g. `png`.
    pub file_type: String,
    pub initial_comment: String,
    pub bytes: Vec<u8>,
}
