//! Lead intake route: `/v1/leads`
//!
//! A valid lead is always accepted. Notification runs inline with no retry;
//! its failure is logged and reported in the response, never as an error.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use lendfront_core::lead::LeadRequest;

use crate::error::AppError;
use crate::state::AppState;

/// Build the `/v1/leads` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(submit))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub accepted: bool,
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Json(lead): Json<LeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    lead.validate()?;

    let received_at = Utc::now();
    let response = match state.notifier.notify(&lead, received_at).await {
        Ok(receipt) => {
            info!(notifier = state.notifier.name(), "lead accepted");
            LeadResponse {
                accepted: true,
                notified: true,
                message_id: receipt.message_id,
            }
        }
        Err(e) => {
            warn!(notifier = state.notifier.name(), error = %e, "lead accepted but notification failed");
            LeadResponse {
                accepted: true,
                notified: false,
                message_id: None,
            }
        }
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}
