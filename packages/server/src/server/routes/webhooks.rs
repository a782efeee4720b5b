//! Webhook intake.
//!
//! POST /api/webhooks
//!
//! Deliveries are acknowledged after signature verification and
//! de-duplicated by event id against a bounded recency window; replays are
//! acknowledged without reprocessing.

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::kernel::signature::verify_signature;
use crate::server::app::AppState;
use crate::server::error::ApiError;

const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

pub async fn webhook_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let presented = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::InvalidSignature)?;
        if !verify_signature(secret, body.as_bytes(), presented) {
            return Err(ApiError::InvalidSignature);
        }
    } else {
        warn!("WEBHOOK_SECRET not set; accepting unsigned webhook");
    }

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    let fresh = state.processed_events.lock().await.insert(&event.id);
    if !fresh {
        info!(event_id = %event.id, kind = %event.kind, "Duplicate webhook delivery");
        return Ok(Json(json!({ "received": true, "duplicate": true })));
    }

    info!(event_id = %event.id, kind = %event.kind, "Webhook received");
    Ok(Json(json!({ "received": true })))
}
