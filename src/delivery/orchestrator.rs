//! Delivery orchestration — bot first, email fallback, typed terminal
//! outcomes.
//!
//! One inbound request drives exactly one pass: build both payloads, try
//! the bot, on failure try email, classify. Every terminal status is
//! returned to the caller and audited exactly once; entering the fallback
//! path additionally audits the intermediate `bot_failed` record, so the
//! full decision trail is reconstructible from the audit log alone.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::audit::{AuditRecord, AuditSink};
use crate::config::RelayConfig;
use crate::delivery::bot::BotChannel;
use crate::delivery::email::{EmailChannel, EmailDisposition};
use crate::directory::Directory;
use crate::request::{FormData, ModelBuilder, RequestType};

/// Terminal status of one delivery attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    BotSuccess,
    EmailSuccess,
    EmailPartial,
    EmailFailed,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BotSuccess => "bot_success",
            Self::EmailSuccess => "email_success",
            Self::EmailPartial => "email_partial",
            Self::EmailFailed => "email_failed",
            Self::Failed => "failed",
        }
    }

    /// Response code the web layer returns for this status. Partial email
    /// delivery is still a user-visible success; a dead email channel is
    /// accepted-but-needs-follow-up; only a model build failure is a 500.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::BotSuccess | Self::EmailSuccess | Self::EmailPartial => StatusCode::OK,
            Self::EmailFailed => StatusCode::ACCEPTED,
            Self::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Response body returned to the caller, shaped per status: successes carry
/// `message`, a partial delivery adds `details`, a dead email channel adds
/// `error`, and a build failure carries `error` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the delivery state machine for each submission.
pub struct Orchestrator {
    config: Arc<RelayConfig>,
    builder: ModelBuilder,
    directory: Arc<dyn Directory>,
    bot: Arc<dyn BotChannel>,
    email: Arc<dyn EmailChannel>,
    audit: Arc<dyn AuditSink>,
}

impl Orchestrator {
    pub fn new(
        config: Arc<RelayConfig>,
        directory: Arc<dyn Directory>,
        bot: Arc<dyn BotChannel>,
        email: Arc<dyn EmailChannel>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let builder = ModelBuilder::new(Arc::clone(&config), Arc::clone(&directory));
        Self {
            config,
            builder,
            directory,
            bot,
            email,
            audit,
        }
    }

    /// Handle one submission end to end.
    ///
    /// Never fails: every outcome, including an unknown type tag or a build
    /// error, is converted into a typed response and audited.
    pub async fn submit(
        &self,
        request_type: &str,
        form: &FormData,
        user: &str,
    ) -> (SubmissionResponse, StatusCode) {
        info!(request_type, user, "Processing request");

        let parsed: RequestType = match request_type.parse() {
            Ok(parsed) => parsed,
            Err(e) => return self.fail(request_type, user, &e.to_string()),
        };

        let (params, message) = match self.builder.build(parsed, form, user) {
            Ok(built) => built,
            Err(e) => {
                return self.fail(
                    request_type,
                    user,
                    &format!("Failed to build request: {e}"),
                );
            }
        };

        // Primary channel.
        let bot_error = match self.bot.deliver(&params).await {
            Ok(()) => {
                self.record(request_type, user, "bot_success", None);
                let response = SubmissionResponse {
                    message: Some(format!(
                        "Your {} request has been submitted successfully.",
                        parsed.label()
                    )),
                    status: DeliveryStatus::BotSuccess,
                    details: None,
                    error: None,
                };
                return (response, DeliveryStatus::BotSuccess.http_status());
            }
            Err(e) => e.to_string(),
        };

        // Fallback channel.
        warn!(
            request_type,
            error = %bot_error,
            "Bot submission failed, attempting email fallback"
        );
        self.record(request_type, user, "bot_failed", Some(&bot_error));

        let sent = match self.directory.user_email(user) {
            Ok(from) => {
                self.email
                    .deliver(&message, &from, &self.config.request_email)
                    .await
            }
            Err(e) => Err(crate::error::ChannelError::SenderResolution(e.to_string())),
        };

        let (status, details, error) = match sent {
            Ok(EmailDisposition::Delivered) => (DeliveryStatus::EmailSuccess, None, None),
            Ok(EmailDisposition::PartiallyDelivered { detail }) => {
                warn!(detail = %detail, "Email partially delivered");
                (DeliveryStatus::EmailPartial, Some(detail), None)
            }
            Err(e) => {
                error!(error = %e, "Email fallback failed");
                (DeliveryStatus::EmailFailed, None, Some(e.to_string()))
            }
        };

        let annotation = details.as_deref().or(error.as_deref());
        self.record(request_type, user, status.as_str(), annotation);

        let message_text = match status {
            DeliveryStatus::EmailSuccess => format!(
                "Your {} request has been submitted successfully via email.",
                parsed.label()
            ),
            DeliveryStatus::EmailPartial => format!(
                "Your {} request was submitted via email, but some issues occurred.",
                parsed.label()
            ),
            _ => format!(
                "Your {} request was logged, but we couldn't email support. \
                 Please contact {}.",
                parsed.label(),
                self.config.help_email
            ),
        };

        let response = SubmissionResponse {
            message: Some(message_text),
            status,
            details,
            error,
        };
        (response, status.http_status())
    }

    /// Terminal failure before any send: audit once and answer 500 with the
    /// help-desk address so the user has a next step.
    fn fail(
        &self,
        request_type: &str,
        user: &str,
        reason: &str,
    ) -> (SubmissionResponse, StatusCode) {
        error!(request_type, user, error = %reason, "Request failed before delivery");
        self.record(request_type, user, "failed", Some(reason));

        let response = SubmissionResponse {
            message: None,
            status: DeliveryStatus::Failed,
            details: None,
            error: Some(format!(
                "Failed to process {} request: {reason}. Please contact {}.",
                request_type.to_lowercase(),
                self.config.help_email
            )),
        };
        (response, DeliveryStatus::Failed.http_status())
    }

    fn record(&self, request_type: &str, user: &str, status: &str, error: Option<&str>) {
        self.audit.record(&AuditRecord::now(
            request_type,
            user,
            status,
            &self.config.cluster_name,
            error,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::directory::{DirectoryError, GroupDirectoryInfo};
    use crate::error::ChannelError;
    use crate::request::{BotParams, OperatorMessage};

    // ── Fakes ───────────────────────────────────────────────────────

    struct FakeDirectory;

    impl Directory for FakeDirectory {
        fn user_email(&self, user: &str) -> Result<String, DirectoryError> {
            Ok(format!("{user}@test.edu"))
        }

        fn group_directory(&self, group: &str) -> Result<GroupDirectoryInfo, DirectoryError> {
            Ok(GroupDirectoryInfo {
                directory: format!("/scratch/group/{group}"),
            })
        }
    }

    #[derive(Clone, Copy)]
    enum BotBehavior {
        Accept,
        Timeout,
        Reject,
    }

    struct FakeBot {
        behavior: BotBehavior,
        calls: Mutex<u32>,
    }

    impl FakeBot {
        fn new(behavior: BotBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl BotChannel for FakeBot {
        async fn deliver(&self, _params: &BotParams) -> Result<(), ChannelError> {
            *self.calls.lock().unwrap() += 1;
            match self.behavior {
                BotBehavior::Accept => Ok(()),
                BotBehavior::Timeout => Err(ChannelError::BotTimeout {
                    timeout: Duration::from_secs(15),
                }),
                BotBehavior::Reject => Err(ChannelError::BotRejected {
                    status: 503,
                    body: "maintenance".into(),
                }),
            }
        }
    }

    #[derive(Clone)]
    enum EmailBehavior {
        Deliver,
        Partial(String),
        Fail(String),
    }

    struct FakeEmail {
        behavior: EmailBehavior,
        calls: Mutex<u32>,
    }

    impl FakeEmail {
        fn new(behavior: EmailBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl EmailChannel for FakeEmail {
        async fn deliver(
            &self,
            _message: &OperatorMessage,
            _from: &str,
            _to: &str,
        ) -> Result<EmailDisposition, ChannelError> {
            *self.calls.lock().unwrap() += 1;
            match &self.behavior {
                EmailBehavior::Deliver => Ok(EmailDisposition::Delivered),
                EmailBehavior::Partial(detail) => Ok(EmailDisposition::PartiallyDelivered {
                    detail: detail.clone(),
                }),
                EmailBehavior::Fail(reason) => {
                    Err(ChannelError::SmtpSend(reason.clone()))
                }
            }
        }
    }

    #[derive(Default)]
    struct MemoryAudit {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl AuditSink for MemoryAudit {
        fn record(&self, record: &AuditRecord) {
            self.records.lock().unwrap().push(record.clone());
        }
    }

    impl MemoryAudit {
        fn statuses(&self) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.status.clone())
                .collect()
        }
    }

    fn orchestrator(
        bot: BotBehavior,
        email: EmailBehavior,
    ) -> (Orchestrator, Arc<FakeBot>, Arc<FakeEmail>, Arc<MemoryAudit>) {
        let bot = Arc::new(FakeBot::new(bot));
        let email = Arc::new(FakeEmail::new(email));
        let audit = Arc::new(MemoryAudit::default());
        let orchestrator = Orchestrator::new(
            Arc::new(RelayConfig::default()),
            Arc::new(FakeDirectory),
            Arc::clone(&bot) as Arc<dyn BotChannel>,
            Arc::clone(&email) as Arc<dyn EmailChannel>,
            Arc::clone(&audit) as Arc<dyn AuditSink>,
        );
        (orchestrator, bot, email, audit)
    }

    fn help_form() -> FormData {
        FormData::new()
            .with("help_request_type", "Jobs")
            .with("issue_description", "job stuck in queue")
    }

    // ── State machine ───────────────────────────────────────────────

    #[tokio::test]
    async fn bot_success_skips_email_and_audits_once() {
        let (orchestrator, _bot, email, audit) =
            orchestrator(BotBehavior::Accept, EmailBehavior::Deliver);
        let (response, code) = orchestrator.submit("Help", &help_form(), "alice").await;

        assert_eq!(response.status, DeliveryStatus::BotSuccess);
        assert_eq!(code, StatusCode::OK);
        assert_eq!(*email.calls.lock().unwrap(), 0);
        assert_eq!(audit.statuses(), vec!["bot_success"]);
        assert!(response.message.unwrap().contains("help request"));
        assert!(response.details.is_none());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn bot_timeout_falls_back_to_email() {
        let (orchestrator, bot, email, audit) =
            orchestrator(BotBehavior::Timeout, EmailBehavior::Deliver);
        let (response, code) = orchestrator.submit("Help", &help_form(), "alice").await;

        assert_eq!(response.status, DeliveryStatus::EmailSuccess);
        assert_eq!(code, StatusCode::OK);
        assert_eq!(*bot.calls.lock().unwrap(), 1);
        assert_eq!(*email.calls.lock().unwrap(), 1);
        assert_eq!(audit.statuses(), vec!["bot_failed", "email_success"]);
    }

    #[tokio::test]
    async fn bot_failed_record_carries_the_bot_error() {
        let (orchestrator, _bot, _email, audit) =
            orchestrator(BotBehavior::Reject, EmailBehavior::Deliver);
        orchestrator.submit("Help", &help_form(), "alice").await;

        let records = audit.records.lock().unwrap();
        assert_eq!(records[0].status, "bot_failed");
        let error = records[0].error.as_deref().unwrap();
        assert!(error.contains("503"));
        assert!(error.contains("maintenance"));
    }

    #[tokio::test]
    async fn email_partial_is_success_with_details() {
        let (orchestrator, _bot, _email, audit) = orchestrator(
            BotBehavior::Reject,
            EmailBehavior::Partial("550 one recipient refused".into()),
        );
        let (response, code) = orchestrator.submit("Help", &help_form(), "alice").await;

        assert_eq!(response.status, DeliveryStatus::EmailPartial);
        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            response.details.as_deref(),
            Some("550 one recipient refused")
        );
        assert!(response.error.is_none());
        assert_eq!(audit.statuses(), vec!["bot_failed", "email_partial"]);
    }

    #[tokio::test]
    async fn email_failure_answers_202_with_help_address() {
        let (orchestrator, _bot, _email, audit) = orchestrator(
            BotBehavior::Timeout,
            EmailBehavior::Fail("connection refused".into()),
        );
        let (response, code) = orchestrator.submit("Help", &help_form(), "alice").await;

        assert_eq!(response.status, DeliveryStatus::EmailFailed);
        assert_eq!(code, StatusCode::ACCEPTED);
        assert!(
            response
                .message
                .as_deref()
                .unwrap()
                .contains("helpdesk@example.edu")
        );
        assert!(response.error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(audit.statuses(), vec!["bot_failed", "email_failed"]);
    }

    #[tokio::test]
    async fn unknown_type_fails_with_500_and_single_audit_record() {
        let (orchestrator, bot, email, audit) =
            orchestrator(BotBehavior::Accept, EmailBehavior::Deliver);
        let (response, code) = orchestrator.submit("Bogus", &FormData::new(), "alice").await;

        assert_eq!(response.status, DeliveryStatus::Failed);
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(*bot.calls.lock().unwrap(), 0);
        assert_eq!(*email.calls.lock().unwrap(), 0);
        assert_eq!(audit.statuses(), vec!["failed"]);
        assert!(response.message.is_none());
        let error = response.error.unwrap();
        assert!(error.contains("bogus request"));
        assert!(error.contains("helpdesk@example.edu"));
    }

    // ── Response serialization shapes ───────────────────────────────

    #[tokio::test]
    async fn success_response_serializes_without_optional_fields() {
        let (orchestrator, ..) = orchestrator(BotBehavior::Accept, EmailBehavior::Deliver);
        let (response, _) = orchestrator.submit("Help", &help_form(), "alice").await;
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "bot_success");
        assert!(json.get("details").is_none());
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn failed_response_serializes_error_without_message() {
        let (orchestrator, ..) = orchestrator(BotBehavior::Accept, EmailBehavior::Deliver);
        let (response, _) = orchestrator.submit("Bogus", &FormData::new(), "alice").await;
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("message").is_none());
        assert!(json["error"].is_string());
    }
}
