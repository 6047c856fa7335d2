//! The `WebApi` trait: the request/response surface the bot facade uses,
//! implemented over HTTP by [`RestWebApiClient`](crate::rest::RestWebApiClient)
//! and by test doubles.

use async_trait::async_trait;
use sb_domain::error::Result;

use crate::types::{MessageResponse, User};

#[async_trait]
pub trait WebApi: Send + Sync {
    /// Post plain text to a channel (`chat.postMessage`).
    async fn post_message(&self, channel: &str, text: &str) -> Result<MessageResponse>;

    /// Every member of the workspace (`users.list`).
    async fn users_list(&self) -> Result<Vec<User>>;

    /// Look up a user in the local directory cache.
    fn user(&self, id: &str) -> Option<User>;
}
