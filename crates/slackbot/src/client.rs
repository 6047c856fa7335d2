//! The bot client: one Socket Mode session plus one Web API client.

use std::future::Future;

use sb_protocol::Event;
use sb_socketmode::{SocketModeClient, SocketModeClientBuilder};
use sb_webapi::{ImageUpload, MessageResponse, RestWebApiClient, User, WebApi};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::options::ClientOptions;

/// A connected Slack bot.
pub struct Client {
    id: String,
    name: String,
    web: RestWebApiClient,
    socket: SocketModeClient,
}

impl Client {
    /// Connect with an app-level token (`xapp-…`) for Socket Mode and a bot
    /// token (`xoxb-…`) for the Web API.
    ///
    /// With a bot name set, the user directory is cached and the bot's own
    /// id is looked up in it; an unknown name is a config error.
    pub async fn new(
        app_token: impl Into<String>,
        bot_token: impl Into<String>,
        opts: ClientOptions,
    ) -> Result<Self> {
        let web = RestWebApiClient::new(&opts.web_api, bot_token)?;
        if opts.caches_users() {
            web.refresh_users_cache().await?;
        }

        let (id, name) = match opts.bot_name {
            Some(name) => {
                let id = web.user_id(&name).ok_or_else(|| {
                    sb_domain::error::Error::Config(format!("bot user {name:?} not found"))
                })?;
                tracing::info!(bot_id = %id, bot_name = %name, "resolved bot identity");
                (id, name)
            }
            None => (String::new(), String::new()),
        };

        let socket = SocketModeClientBuilder::from_config(&opts.socket_mode)
            .app_token(app_token)
            .debug(opts.debug)
            .connect()
            .await?;

        Ok(Self {
            id,
            name,
            web,
            socket,
        })
    }

    /// The bot's user id; empty unless a bot name was given.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<@ID>`, the prefix Slack puts on messages that mention the bot.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    pub fn web(&self) -> &RestWebApiClient {
        &self.web
    }

    pub fn socket(&self) -> &SocketModeClient {
        &self.socket
    }

    // ── real-time ────────────────────────────────────────────────────

    /// Process one inbound frame; see [`SocketModeClient::receive_message`].
    pub async fn receive_message<F, Fut>(&self, cancel: &CancellationToken, handler: F) -> Result<()>
    where
        F: FnOnce(Event) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        Ok(self.socket.receive_message(cancel, handler).await?)
    }

    /// Receive until `cancel` fires; see [`SocketModeClient::run`].
    pub async fn run<F, Fut>(&self, cancel: CancellationToken, handler: F) -> Result<()>
    where
        F: Fn(Event) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        Ok(self.socket.run(cancel, handler).await?)
    }

    pub async fn close(&self) -> Result<()> {
        Ok(self.socket.close().await?)
    }

    // ── Web API ──────────────────────────────────────────────────────

    pub async fn post_message(&self, channel: &str, text: &str) -> Result<MessageResponse> {
        Ok(self.web.post_message(channel, text).await?)
    }

    pub async fn respond_to_command(&self, response_url: &str, text: &str, visible: bool) -> Result<()> {
        Ok(self.web.respond_to_command(response_url, text, visible).await?)
    }

    pub async fn upload_image(&self, upload: ImageUpload) -> Result<()> {
        Ok(self.web.upload_image(upload).await?)
    }

    /// Cached user by id.
    pub fn user(&self, id: &str) -> Option<User> {
        self.web.user(id)
    }

    /// Cached user id by name, skipping deleted users.
    pub fn user_id(&self, name: &str) -> Option<String> {
        self.web.user_id(name)
    }
}
