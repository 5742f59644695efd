//! Delivery — the two outbound channels and the fallback orchestration.

pub mod bot;
pub mod email;
pub mod orchestrator;

pub use bot::{BotChannel, HttpBot};
pub use email::{EmailChannel, EmailDisposition, SmtpRelay};
pub use orchestrator::{DeliveryStatus, Orchestrator, SubmissionResponse};
