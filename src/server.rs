//! HTTP surface — the thin route the web layer posts submissions to.
//!
//! No form or session logic lives here; the route translates the
//! orchestrator's `(response, code)` pair directly.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::delivery::{Orchestrator, SubmissionResponse};
use crate::request::FormData;

/// Inbound submission payload from the web layer.
#[derive(Debug, Deserialize)]
pub struct SubmitPayload {
    pub request_type: String,
    pub form_data: FormData,
    pub user: String,
}

/// Build the submission router.
pub fn routes(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/api/requests", post(submit))
        .with_state(orchestrator)
}

async fn submit(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(payload): Json<SubmitPayload>,
) -> (StatusCode, Json<SubmissionResponse>) {
    let (response, code) = orchestrator
        .submit(&payload.request_type, &payload.form_data, &payload.user)
        .await;
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_nested_form_data() {
        let payload: SubmitPayload = serde_json::from_value(serde_json::json!({
            "request_type": "Software",
            "form_data": {
                "software_name": "gromacs",
                "target_users": ["alice", "bob"],
            },
            "user": "alice",
        }))
        .unwrap();
        assert_eq!(payload.request_type, "Software");
        assert_eq!(payload.user, "alice");
        assert_eq!(payload.form_data.get("software_name"), Some("gromacs"));
    }
}
