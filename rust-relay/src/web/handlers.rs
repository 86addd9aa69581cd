//! Webhook endpoint handlers.
//!
//! The webhook handler only does three things:
//! 1. Verify the request signature against the raw body bytes
//! 2. Fan the verified body out to the configured downstream endpoints
//! 3. Acknowledge with 202 once every forward has settled
//!
//! Forward failures are logged, never surfaced to the caller.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::forward::Forwarder;
use crate::web::signature::verify_line_signature;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, forwarder: Forwarder) -> Self {
        Self {
            config: Arc::new(config),
            forwarder,
        }
    }
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Webhook response body.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub message: &'static str,
}

/// LINE webhook endpoint.
///
/// The body is taken as raw bytes; it must reach the verifier exactly as
/// sent, so this route never parses it. Responds 401 when the signature
/// header is absent or does not match, 202 once all forwards have settled.
pub async fn line_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = match headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(s) => s,
        None => {
            warn!("line_webhook_signature_missing");
            return (
                StatusCode::UNAUTHORIZED,
                Json(WebhookResponse {
                    message: "Missing Signature",
                }),
            );
        }
    };

    info!(body_length = body.len(), "line_webhook_received");

    if !verify_line_signature(&state.config.channel_secret, &body, signature) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookResponse {
                message: "Invalid Signature",
            }),
        );
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");

    let outcomes = state
        .forwarder
        .fan_out(&body, signature, user_agent, content_type)
        .await;

    info!(
        dispatched = outcomes.len(),
        succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
        "line_webhook_forward_complete"
    );

    (
        StatusCode::ACCEPTED,
        Json(WebhookResponse {
            message: "Webhook received with verified signature",
        }),
    )
}
