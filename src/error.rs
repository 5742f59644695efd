//! Error types for the request relay.

use std::time::Duration;

use crate::directory::DirectoryError;

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Request-model construction errors.
///
/// `UnknownRequestType` is the only error the type boundary itself raises;
/// anything else that goes wrong while building a model (a failed directory
/// lookup) also lands here and is converted to the `failed` outcome at the
/// orchestrator boundary.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Unknown request type: {0}")]
    UnknownRequestType(String),

    #[error(transparent)]
    Lookup(#[from] DirectoryError),
}

/// Outbound channel errors — bot HTTP delivery and email fallback.
///
/// These never propagate past the orchestrator; they select the fallback
/// path (bot) or the `email_failed` outcome (email).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Bot returned {status}: {body}")]
    BotRejected { status: u16, body: String },

    #[error("Bot request timed out after {timeout:?}")]
    BotTimeout { timeout: Duration },

    #[error("Bot request failed: {0}")]
    BotTransport(String),

    #[error("Invalid mail address {address}: {reason}")]
    BadAddress { address: String, reason: String },

    #[error("Failed to build email: {0}")]
    EmailBuild(String),

    #[error("SMTP send failed: {0}")]
    SmtpSend(String),

    #[error("Sender resolution failed: {0}")]
    SenderResolution(String),
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
