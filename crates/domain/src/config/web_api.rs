use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Web API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebApiConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    /// Fill the user cache from `users.list` when the client is created.
    /// Requires the `users:read` scope.
    #[serde(default)]
    pub cache_users: bool,
}

impl Default for WebApiConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            timeout_ms: 10_000,
            cache_users: false,
        }
    }
}

fn d_base_url() -> String {
    "https://slack.com/api".into()
}
fn d_10000() -> u64 {
    10_000
}
