//! Email fallback — SMTP delivery of the operator message.

use async_trait::async_trait;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use crate::error::ChannelError;
use crate::request::OperatorMessage;

/// How the transport disposed of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailDisposition {
    /// Accepted for every recipient.
    Delivered,
    /// Accepted, but the relay rejected some recipients. Still a success
    /// from the requester's point of view — the message is in the
    /// operator's inbox — but the detail is surfaced to the caller.
    PartiallyDelivered { detail: String },
}

/// Secondary delivery channel, used only after the bot has failed.
#[async_trait]
pub trait EmailChannel: Send + Sync {
    async fn deliver(
        &self,
        message: &OperatorMessage,
        from: &str,
        to: &str,
    ) -> Result<EmailDisposition, ChannelError>;
}

/// Plain SMTP submission to a fixed relay host/port. The campus relay
/// accepts unauthenticated mail from cluster hosts on port 25.
pub struct SmtpRelay {
    host: String,
    port: u16,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl EmailChannel for SmtpRelay {
    async fn deliver(
        &self,
        message: &OperatorMessage,
        from: &str,
        to: &str,
    ) -> Result<EmailDisposition, ChannelError> {
        info!(to, "Attempting email fallback");

        let email = Message::builder()
            .from(from.parse().map_err(|e| ChannelError::BadAddress {
                address: from.to_string(),
                reason: format!("{e}"),
            })?)
            .to(to.parse().map_err(|e| ChannelError::BadAddress {
                address: to.to_string(),
                reason: format!("{e}"),
            })?)
            .subject(message.subject.clone())
            .body(message.body.clone())
            .map_err(|e| ChannelError::EmailBuild(e.to_string()))?;

        let transport = SmtpTransport::builder_dangerous(&self.host)
            .port(self.port)
            .build();

        // lettre's SMTP transport blocks; keep it off the async runtime.
        let result = tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| ChannelError::SmtpSend(format!("send task failed: {e}")))?;

        match result {
            Ok(response) if response.is_positive() => {
                info!(to, "Email sent successfully");
                Ok(EmailDisposition::Delivered)
            }
            Ok(response) => {
                let detail = format!(
                    "relay answered {}: {}",
                    response.code(),
                    response.message().collect::<Vec<_>>().join(" ")
                );
                warn!(to, detail = %detail, "Email relay gave a non-positive reply");
                Err(ChannelError::SmtpSend(detail))
            }
            Err(e) => Err(ChannelError::SmtpSend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_partial_carries_detail() {
        let disposition = EmailDisposition::PartiallyDelivered {
            detail: "550 mailbox over quota".into(),
        };
        match disposition {
            EmailDisposition::PartiallyDelivered { detail } => {
                assert!(detail.contains("550"));
            }
            EmailDisposition::Delivered => panic!("expected partial"),
        }
    }

    #[test]
    fn relay_construction_keeps_host_and_port() {
        let relay = SmtpRelay::new("smtp.tamu.edu", 25);
        assert_eq!(relay.host, "smtp.tamu.edu");
        assert_eq!(relay.port, 25);
    }
}
