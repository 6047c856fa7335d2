use sb_socketmode::SocketModeError;

/// Any failure surfaced by the bot [`Client`](crate::Client).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Web API, configuration, or I/O failure.
    #[error(transparent)]
    Api(#[from] sb_domain::error::Error),

    /// Socket Mode session failure.
    #[error(transparent)]
    SocketMode(#[from] SocketModeError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the caller cancelled the receive.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::SocketMode(SocketModeError::Cancelled))
    }
}
