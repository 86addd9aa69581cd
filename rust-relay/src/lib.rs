//! LineRelay - webhook relay with signature verification.
//!
//! Receives LINE webhook requests, authenticates them via the channel
//! secret's HMAC-SHA256 signature, and forwards the verified raw body to a
//! configured list of downstream endpoints.
//!
//! ## Architecture
//!
//! ```text
//! LINE → Web Server → Signature Verifier → Fan-out Forwarder → endpoints
//! ```

pub mod config;
pub mod forward;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use forward::{ForwardError, ForwardOutcome, Forwarder};
pub use web::{router, AppState};
