use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Bot identity and credentials
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Display name used to look up the bot's own user id.
    /// Setting it implies caching the user directory.
    #[serde(default)]
    pub name: Option<String>,
    /// Environment variable holding the app-level token (`xapp-...`).
    #[serde(default = "d_app_token_env")]
    pub app_token_env: String,
    /// Environment variable holding the bot token (`xoxb-...`).
    #[serde(default = "d_bot_token_env")]
    pub bot_token_env: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: None,
            app_token_env: d_app_token_env(),
            bot_token_env: d_bot_token_env(),
        }
    }
}

fn d_app_token_env() -> String {
    "SLACK_APP_TOKEN".into()
}
fn d_bot_token_env() -> String {
    "SLACK_BOT_TOKEN".into()
}
