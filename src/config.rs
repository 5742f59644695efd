//! Process-wide configuration — set once at startup, read-only afterwards.

use std::time::Duration;

use crate::error::ConfigError;

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Cluster display name, used in subjects, messages, and audit records.
    pub cluster_name: String,
    /// Base URL of the bot service.
    pub bot_route: String,
    /// Intake mailbox the email fallback delivers to.
    pub request_email: String,
    /// Help-desk address embedded in failure messages.
    pub help_email: String,
    /// Bound on the bot HTTP call.
    pub bot_timeout: Duration,
    /// SMTP relay host for the email fallback.
    pub smtp_host: String,
    /// SMTP relay port (plain submission, no TLS).
    pub smtp_port: u16,
}

impl RelayConfig {
    /// Build config from environment variables.
    ///
    /// `CLUSTER_NAME`, `BOT_ROUTE`, `REQUEST_EMAIL`, and `HELP_EMAIL` are
    /// required; the rest default to the reference deployment values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let required = |key: &str| {
            std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
        };

        let bot_timeout_secs: u64 = match std::env::var("BOT_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BOT_TIMEOUT_SECS".into(),
                message: format!("not an integer: {raw}"),
            })?,
            Err(_) => 15,
        };

        let smtp_port: u16 = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SMTP_PORT".into(),
                message: format!("not a port number: {raw}"),
            })?,
            Err(_) => 25,
        };

        Ok(Self {
            cluster_name: required("CLUSTER_NAME")?,
            bot_route: required("BOT_ROUTE")?,
            request_email: required("REQUEST_EMAIL")?,
            help_email: required("HELP_EMAIL")?,
            bot_timeout: Duration::from_secs(bot_timeout_secs),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.tamu.edu".to_string()),
            smtp_port,
        })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            cluster_name: "cluster".to_string(),
            bot_route: "http://localhost:9000".to_string(),
            request_email: "requests@example.edu".to_string(),
            help_email: "helpdesk@example.edu".to_string(),
            bot_timeout: Duration::from_secs(15),
            smtp_host: "smtp.tamu.edu".to_string(),
            smtp_port: 25,
        }
    }
}
