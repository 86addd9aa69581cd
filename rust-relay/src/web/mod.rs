//! Web server module for the webhook relay.
//!
//! Receives LINE webhooks, verifies the HMAC signature against the raw body
//! bytes, and fans the verified payload out to the configured downstream
//! endpoints before acknowledging the caller.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};

pub use handlers::{health, line_webhook, AppState, HealthResponse, WebhookResponse};
pub use signature::{compute_signature, verify_line_signature};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(line_webhook))
        .with_state(state)
}
