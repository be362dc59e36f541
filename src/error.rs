//! Error types for the trading bot

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    /// Not enough samples to produce an estimate
    #[error("insufficient data: need {needed} samples, have {have}")]
    InsufficientData { needed: usize, have: usize },

    /// Non-positive price/quantity or otherwise unusable input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Exchange API rejected or failed a request
    #[error("exchange call failed: {0}")]
    Exchange(String),

    /// Notification delivery failed (never fatal)
    #[error("notification failed: {0}")]
    Notify(String),

    /// Required credentials or parameters are absent
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}
