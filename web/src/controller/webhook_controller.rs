//! Controller for Trello webhook deliveries.
//!
//! Trello verifies a callback URL with a HEAD request when the webhook is
//! registered, then POSTs one JSON document per board action. It retries
//! any delivery that doesn't get a 2xx, so by default every delivery is
//! acknowledged, including ones the relay doesn't model or can't parse.

use crate::AppState;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use domain::normalizer;
use log::*;
use serde_json::Value;

/// HEAD /api/webhook
///
/// Webhook registration handshake. No validation, empty body.
pub async fn validate() -> impl IntoResponse {
    debug!("Trello webhook HEAD received for validation");
    StatusCode::OK
}

/// POST /api/webhook
///
/// Classifies the delivery and, if it is a task event, relays it to the
/// board's live connections. This endpoint does not require authentication.
pub async fn receive(State(app_state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("Webhook body is not JSON ({e}); treating it as not relevant");
            Value::Null
        }
    };

    match normalizer::normalize(&raw) {
        Some(event) => {
            info!(
                "Webhook delivery classified as {} for board {}",
                event.kind(),
                event.topic()
            );
            app_state.event_publisher.publish(event).await;
            StatusCode::OK
        }
        None => {
            let action_type = raw
                .pointer("/action/type")
                .and_then(Value::as_str)
                .unwrap_or("<none>");
            debug!("Webhook delivery of type {action_type} is not relevant to tasks");

            if app_state.config().acknowledge_irrelevant_webhooks {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
    }
}
