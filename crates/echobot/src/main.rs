//! Echo bot over Socket Mode.
//!
//! Replies `Hi, <name>: <text>` to messages that mention it and answers
//! slash commands in channel.
//!
//! Usage:
//!   SLACK_APP_TOKEN=xapp-... SLACK_BOT_TOKEN=xoxb-... echobot --name echobot
//!
//! Env vars:
//!   SLACK_APP_TOKEN  app-level token (name configurable via `[bot].app_token_env`)
//!   SLACK_BOT_TOKEN  bot token (name configurable via `[bot].bot_token_env`)
//!   RUST_LOG         log filter (default: "info")

mod cli;
mod echo;

use anyhow::Context;
use clap::Parser;
use sb_domain::config::{Config, ConfigSeverity};
use slackbot::{Client, ClientOptions, Event};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::echo::Reply;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        None | Some(Command::Run) => run(config, cli.name, cli.debug).await,
        Some(Command::Validate) => {
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
                std::process::exit(1);
            }
            println!("{}: ok", cli.config);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(config: Config, name: Option<String>, debug: bool) -> anyhow::Result<()> {
    let app_token = std::env::var(&config.bot.app_token_env)
        .with_context(|| format!("{} is not set", config.bot.app_token_env))?;
    let bot_token = std::env::var(&config.bot.bot_token_env)
        .with_context(|| format!("{} is not set", config.bot.bot_token_env))?;

    let mut opts = ClientOptions::from_config(&config);
    if debug {
        opts = opts.debug(true);
    }
    if let Some(name) = name.or(config.bot.name.clone()).filter(|n| !n.is_empty()) {
        opts = opts.bot_name(name);
    }

    let bot = Client::new(app_token, bot_token, opts)
        .await
        .context("failed to start bot")?;
    tracing::info!(bot_id = %bot.id(), bot_name = %bot.name(), "echobot connected, ^C exits");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, shutting down");
                on_signal.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for ctrl-c"),
        }
    });

    let handler = |event: Event| {
        let bot = &bot;
        async move {
            let author = bot.user(&event.user_id);
            match echo::reply_to(&event, &bot.mention(), author.as_ref()) {
                Reply::Post { channel, text } => {
                    bot.post_message(&channel, &text).await?;
                }
                Reply::Respond {
                    response_url,
                    text,
                    visible,
                } => {
                    bot.respond_to_command(&response_url, &text, visible).await?;
                }
                Reply::Ignore => {
                    tracing::debug!(event_type = %event.event_type, "nothing to echo");
                }
            }
            Ok::<_, anyhow::Error>(())
        }
    };

    bot.run(cancel, handler).await?;
    if let Err(e) = bot.close().await {
        tracing::debug!(error = %e, "close after shutdown");
    }
    Ok(())
}
