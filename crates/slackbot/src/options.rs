//! Construction options for [`Client`](crate::Client).

use sb_domain::config::{Config, SocketModeConfig, WebApiConfig};

/// Options applied once when a [`Client`](crate::Client) is created.
///
/// ```rust
/// # use slackbot::ClientOptions;
/// let opts = ClientOptions::new().bot_name("echobot").debug(true);
/// assert!(opts.caches_users());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub(crate) cache_users: bool,
    pub(crate) debug: bool,
    pub(crate) bot_name: Option<String>,
    pub(crate) socket_mode: SocketModeConfig,
    pub(crate) web_api: WebApiConfig,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every section of a loaded config file.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            cache_users: cfg.web_api.cache_users,
            debug: cfg.socket_mode.debug,
            bot_name: cfg.bot.name.clone(),
            socket_mode: cfg.socket_mode.clone(),
            web_api: cfg.web_api.clone(),
        }
    }

    /// Fill the user directory from `users.list` at startup.
    /// Requires the `users:read` scope.
    pub fn cache_users(mut self, on: bool) -> Self {
        self.cache_users = on;
        self
    }

    /// Dump every inbound envelope.
    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Resolve the bot's own user id from its display name.
    /// Implies [`cache_users`](Self::cache_users).
    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    pub fn socket_mode(mut self, cfg: SocketModeConfig) -> Self {
        self.socket_mode = cfg;
        self
    }

    pub fn web_api(mut self, cfg: WebApiConfig) -> Self {
        self.web_api = cfg;
        self
    }

    pub fn caches_users(&self) -> bool {
        self.cache_users || self.bot_name.is_some()
    }
}
