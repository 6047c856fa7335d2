//! REST implementation of [`WebApi`].
//!
//! `RestWebApiClient` wraps a `reqwest::Client`, authenticates every Web API
//! call with the bot token, and keeps an in-memory directory of workspace
//! users filled from `users.list`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use sb_domain::config::WebApiConfig;
use sb_domain::error::{Error, Result};
use sb_domain::trace::TraceEvent;
use serde::de::DeserializeOwned;

use crate::provider::WebApi;
use crate::types::{ImageUpload, MessageResponse, ResponseStatus, User, UsersListResponse};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A Web API client bound to one bot token.
///
/// Cheap to clone; clones share the connection pool and the user cache.
#[derive(Debug, Clone)]
pub struct RestWebApiClient {
    http: Client,
    base_url: String,
    token: String,
    timeout: Duration,
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl RestWebApiClient {
    /// Build a new client from the `[web_api]` section and a bot token.
    ///
    /// The user cache starts empty; see [`refresh_users_cache`](Self::refresh_users_cache).
    pub fn new(cfg: &WebApiConfig, token: impl Into<String>) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
            timeout,
            users: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Full URL for a method name like `chat.postMessage`.
    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Send one request, emit a `WebApiCall` trace, and return the body of
    /// a 2xx response.
    async fn execute(&self, method: &str, rb: RequestBuilder) -> Result<String> {
        let start = Instant::now();
        let result = rb.send().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                TraceEvent::WebApiCall {
                    method: method.to_owned(),
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    duration_ms,
                }
                .emit();
                return Err(from_reqwest(e));
            }
        };

        let status = resp.status();
        TraceEvent::WebApiCall {
            method: method.to_owned(),
            status: status.as_u16(),
            duration_ms,
        }
        .emit();

        let body = resp.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            return Err(Error::Http(format!("{method} returned {status}: {body}")));
        }
        Ok(body)
    }

    /// Check the `ok` block, then decode the method-specific body.
    fn parse_reply<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
        let status: ResponseStatus = serde_json::from_str(body).map_err(|e| {
            Error::Http(format!("{method}: undecodable response: {e}: {body}"))
        })?;
        status.into_result(method)?;
        Ok(serde_json::from_str(body)?)
    }

    // ── extra Web API surface ────────────────────────────────────────

    /// Reply to a slash command through its `response_url`.
    ///
    /// `visible` posts the reply to the whole channel; otherwise only the
    /// invoking user sees it.
    pub async fn respond_to_command(&self, response_url: &str, text: &str, visible: bool) -> Result<()> {
        let body = serde_json::json!({
            "response_type": if visible { "in_channel" } else { "ephemeral" },
            "text": text,
        });
        self.execute("response_url", self.http.post(response_url).json(&body))
            .await?;
        Ok(())
    }

    /// Share an image with one or more channels (`files.upload`).
    pub async fn upload_image(&self, upload: ImageUpload) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::Config("bot token is empty".into()));
        }

        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("channels", upload.channels.join(","))
            .text("filetype", upload.file_type)
            .text("title", upload.title)
            .text("initial_comment", upload.initial_comment);

        let method = "files.upload";
        let body = self
            .execute(
                method,
                self.http
                    .post(self.url(method))
                    .bearer_auth(&self.token)
                    .multipart(form),
            )
            .await?;
        Self::parse_reply::<serde_json::Value>(method, &body)?;
        tracing::debug!(file_name = %upload.file_name, "image uploaded");
        Ok(())
    }

    /// Every workspace member keyed by user id.
    pub async fn users(&self) -> Result<HashMap<String, User>> {
        let members = self.users_list().await?;
        Ok(members.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    /// Replace the cached user directory with a fresh `users.list`.
    pub async fn refresh_users_cache(&self) -> Result<()> {
        let users = self.users().await?;
        let count = users.len();
        *self.users.write() = users;
        TraceEvent::UsersCached { count }.emit();
        Ok(())
    }

    /// Id of the first non-deleted cached user with this name.
    pub fn user_id(&self, name: &str) -> Option<String> {
        self.users
            .read()
            .values()
            .find(|u| !u.deleted && u.name == name)
            .map(|u| u.id.clone())
    }

    pub fn cached_user_count(&self) -> usize {
        self.users.read().len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl WebApi for RestWebApiClient {
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageResponse> {
        let method = "chat.postMessage";
        let body = self
            .execute(
                method,
                self.http
                    .post(self.url(method))
                    .bearer_auth(&self.token)
                    .form(&[("channel", channel), ("text", text)]),
            )
            .await?;
        Self::parse_reply(method, &body)
    }

    async fn users_list(&self) -> Result<Vec<User>> {
        let method = "users.list";
        let body = self
            .execute(
                method,
                self.http
                    .post(self.url(method))
                    .bearer_auth(&self.token)
                    .header(reqwest::header::CONTENT_TYPE, "application/json"),
            )
            .await?;
        let list: UsersListResponse = Self::parse_reply(method, &body)?;
        Ok(list.members)
    }

    fn user(&self, id: &str) -> Option<User> {
        self.users.read().get(id).cloned()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into the shared [`Error`] type.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
