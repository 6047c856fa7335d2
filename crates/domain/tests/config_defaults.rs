use std::io::Write;

use sb_domain::config::Config;

#[test]
fn default_endpoints_point_at_slack() {
    let config = Config::default();
    assert_eq!(
        config.socket_mode.connections_open_url,
        "https://slack.com/api/apps.connections.open"
    );
    assert_eq!(config.web_api.base_url, "https://slack.com/api");
}

#[test]
fn default_timeouts_are_ten_seconds() {
    let config = Config::default();
    assert_eq!(config.socket_mode.timeout_ms, 10_000);
    assert_eq!(config.web_api.timeout_ms, 10_000);
}

#[test]
fn default_token_env_vars() {
    let config = Config::default();
    assert_eq!(config.bot.app_token_env, "SLACK_APP_TOKEN");
    assert_eq!(config.bot.bot_token_env, "SLACK_BOT_TOKEN");
    assert!(config.bot.name.is_none());
}

#[test]
fn partial_socket_mode_section_keeps_other_defaults() {
    let toml_str = r#"
[socket_mode]
debug = true

[socket_mode.reconnect]
max_attempts = 5
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(config.socket_mode.debug);
    assert_eq!(config.socket_mode.timeout_ms, 10_000);
    assert_eq!(config.socket_mode.reconnect.max_attempts, 5);
    assert_eq!(config.socket_mode.reconnect.initial_delay_ms, 1000);
}

#[test]
fn bot_section_parses() {
    let toml_str = r#"
[bot]
name = "echobot"

[web_api]
cache_users = true
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.bot.name.as_deref(), Some("echobot"));
    assert!(config.web_api.cache_users);
}

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[web_api]\nbase_url = \"http://127.0.0.1:9/api\"").unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.web_api.base_url, "http://127.0.0.1:9/api");
}

#[test]
fn load_or_default_falls_back_when_missing() {
    let config = Config::load_or_default("/nonexistent/slackbot.toml");
    assert_eq!(config.web_api.base_url, "https://slack.com/api");
}
