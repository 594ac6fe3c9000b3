//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors raised while loading the custom trigger file.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Failed to read trigger file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse trigger file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Trigger '{pattern}' is not a valid regex: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Trigger '{pattern}' has no responses")]
    EmptyResponses { pattern: String },
}

/// Card API errors. All of them turn into a diagnostic chat reply.
#[derive(Debug, Error)]
pub enum CardApiError {
    #[error("Card API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Card API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Card API response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Spell store errors, kept apart from "no matching spell".
///
/// `Unavailable` means no connection could be made; `Query` means the
/// database answered with an error (missing table, bad column type).
#[derive(Debug, Error)]
pub enum SpellStoreError {
    #[error("Spell store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("Spell store query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Discord-related errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Failed to send message to channel {channel_id}: {source}")]
    SendFailed {
        channel_id: u64,
        #[source]
        source: serenity::Error,
    },
}

/// Result type alias for Discord operations.
pub type DiscordResult<T> = std::result::Result<T, DiscordError>;
