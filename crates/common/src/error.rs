//! Unified error type for the dotd-bot.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Odds feed error (status={status}): {message}")]
    Feed { status: u16, message: String },

    #[error("Poll feed error: {0}")]
    Poll(String),

    #[error("Session token error: {0}")]
    Token(String),

    #[error("American odds of zero are undefined")]
    ZeroOdds,

    #[error("Probability {0} outside (0,1)")]
    ProbabilityRange(f64),
}
