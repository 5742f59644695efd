//! Bot channel — primary HTTP delivery of the bot parameter set.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::ChannelError;
use crate::request::BotParams;

/// Submission path the bot service exposes.
const SUBMIT_PATH: &str = "/HPRCapp/OOD";

/// Primary delivery channel. Failures are returned, never raised — the
/// orchestrator treats any error as the trigger for the email fallback.
#[async_trait]
pub trait BotChannel: Send + Sync {
    async fn deliver(&self, params: &BotParams) -> Result<(), ChannelError>;
}

/// HTTP implementation posting the parameter set as JSON with a bounded
/// per-request timeout.
pub struct HttpBot {
    client: reqwest::Client,
    route: String,
    timeout: Duration,
}

impl HttpBot {
    pub fn new(route: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            route: route.into(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{SUBMIT_PATH}", self.route.trim_end_matches('/'))
    }
}

#[async_trait]
impl BotChannel for HttpBot {
    async fn deliver(&self, params: &BotParams) -> Result<(), ChannelError> {
        let request_type = params.get_str("request_type").unwrap_or("?");
        info!(request_type, "Sending request to bot");
        debug!(
            payload = %serde_json::to_string(params).unwrap_or_default(),
            "Bot payload"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChannelError::BotTimeout {
                        timeout: self.timeout,
                    }
                } else {
                    ChannelError::BotTransport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // The bot answers 200, or the literal sentinel "OK" on legacy routes.
        if status.is_success() || body == "OK" {
            info!(request_type, "Bot accepted request");
            Ok(())
        } else {
            let err = ChannelError::BotRejected {
                status: status.as_u16(),
                body,
            };
            warn!(request_type, error = %err, "Bot rejected request");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_submit_path() {
        let bot = HttpBot::new("http://bot.example.edu:9000", Duration::from_secs(15));
        assert_eq!(bot.endpoint(), "http://bot.example.edu:9000/HPRCapp/OOD");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let bot = HttpBot::new("http://bot.example.edu:9000/", Duration::from_secs(15));
        assert_eq!(bot.endpoint(), "http://bot.example.edu:9000/HPRCapp/OOD");
    }
}
