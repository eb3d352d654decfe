//! Error types for rosterbot.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network or API failure talking to the chat platform.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The chat platform rejected the bot credential.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Web error: {0}")]
    Web(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        use serenity::gateway::GatewayError;

        match err {
            serenity::Error::Gateway(GatewayError::InvalidAuthentication) => {
                Error::Auth("invalid bot token".to_string())
            }
            other => Error::Transport(other.to_string()),
        }
    }
}
