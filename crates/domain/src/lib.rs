//! `sb-domain` — types shared by every slackbot crate: the common
//! [`error::Error`], the TOML-backed [`config::Config`], and structured
//! [`trace::TraceEvent`]s.

pub mod config;
pub mod error;
pub mod trace;
