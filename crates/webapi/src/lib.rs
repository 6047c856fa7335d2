//! `sb-webapi` — Slack Web API client for the bot.
//!
//! Provides the [`WebApi`] trait, a reqwest-backed implementation
//! ([`RestWebApiClient`]) with a user-directory cache, and typed response
//! DTOs.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use sb_domain::config::WebApiConfig;
//! use sb_webapi::{RestWebApiClient, WebApi};
//!
//! # async fn example() -> sb_domain::error::Result<()> {
//! let client = RestWebApiClient::new(&WebApiConfig::default(), "xoxb-...")?;
//! client.refresh_users_cache().await?;
//!
//! if let Some(id) = client.user_id("echobot") {
//!     println!("bot user id: {id}");
//! }
//! client.post_message("C0123456", "hello").await?;
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod rest;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use provider::WebApi;
pub use rest::{from_reqwest, RestWebApiClient};
pub use types::{Attachment, ImageUpload, Message, MessageResponse, User, UsersListResponse};
