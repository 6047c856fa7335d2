//! `slackbot` — build a Slack bot on Socket Mode.
//!
//! [`Client`] pairs a Socket Mode session (events in) with a Web API client
//! (messages out) and optionally resolves the bot's own user id.
//!
//! ```rust,no_run
//! use slackbot::{Client, ClientOptions, Event};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> slackbot::Result<()> {
//! let bot = Client::new("xapp-...", "xoxb-...", ClientOptions::new().bot_name("echobot")).await?;
//! let cancel = CancellationToken::new();
//! bot.run(cancel, |event: Event| async move {
//!     println!("{}: {}", event.event_type, event.text);
//!     Ok(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod options;

pub use client::Client;
pub use error::{Error, Result};
pub use options::ClientOptions;

pub use sb_protocol::{Event, EventType};
pub use sb_webapi::{ImageUpload, MessageResponse, User};
