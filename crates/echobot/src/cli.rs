use clap::{Parser, Subcommand};

/// Echo bot that replies to mentions and slash commands over Socket Mode.
#[derive(Debug, Parser)]
#[command(name = "echobot", version, about)]
pub struct Cli {
    /// Path to the TOML config file; missing files fall back to defaults.
    #[arg(long, short, env = "ECHOBOT_CONFIG", default_value = "echobot.toml")]
    pub config: String,

    /// Bot display name; overrides `[bot].name`.
    #[arg(long)]
    pub name: Option<String>,

    /// Dump every inbound envelope.
    #[arg(long)]
    pub debug: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect and echo (default when no subcommand is given).
    Run,
    /// Parse the config file and report any issues.
    Validate,
}
