//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables once at startup.

use std::env;

use anyhow::{bail, Context, Result};
use tracing::warn;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// LINE channel secret used as the HMAC key for signature verification
    pub channel_secret: String,

    /// Downstream endpoints each verified webhook is forwarded to
    pub forward_endpoints: Vec<Url>,

    /// Per-forward HTTP request timeout in milliseconds
    pub forward_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails if `LINE_CHANNEL_SECRET` is unset or empty, or if any entry in
    /// `FORWARD_ENDPOINTS` is not a valid URL.
    pub fn from_env() -> Result<Self> {
        let channel_secret =
            env::var("LINE_CHANNEL_SECRET").context("LINE_CHANNEL_SECRET must be set")?;
        if channel_secret.is_empty() {
            bail!("LINE_CHANNEL_SECRET must not be empty");
        }

        let forward_endpoints = parse_endpoints("FORWARD_ENDPOINTS")?;
        if forward_endpoints.is_empty() {
            warn!("FORWARD_ENDPOINTS is empty, verified webhooks will not be forwarded anywhere");
        }

        Ok(Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            channel_secret,

            forward_endpoints,

            forward_timeout_ms: env::var("FORWARD_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }
}

/// Parse a comma-separated list of URLs from an environment variable.
fn parse_endpoints(name: &str) -> Result<Vec<Url>> {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return Ok(Vec::new()),
    };

    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| Url::parse(s).with_context(|| format!("{} contains an invalid URL: {}", name, s)))
        .collect()
}
