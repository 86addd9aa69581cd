//! Fan-out forwarding of verified webhooks to downstream endpoints.
//!
//! Each verified webhook is re-posted to every configured endpoint with the
//! original body bytes and signature headers. Forwards are dispatched
//! concurrently and the handler waits for all of them to settle; individual
//! failures are logged per endpoint and never retried.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};
use url::Url;

/// Error raised by a single forward attempt.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Outcome of forwarding one webhook to one endpoint.
#[derive(Debug)]
pub struct ForwardOutcome {
    /// The endpoint the forward was sent to
    pub endpoint: Url,
    /// Response status, or the transport error that prevented a response
    pub result: Result<StatusCode, ForwardError>,
}

impl ForwardOutcome {
    /// Whether the forward reached the endpoint and got a 2xx response.
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(status) if status.is_success())
    }
}

/// Forwards verified webhooks to a fixed set of downstream endpoints.
///
/// Cheap to clone; the endpoint list and HTTP connection pool are shared.
#[derive(Clone)]
pub struct Forwarder {
    client: Client,
    endpoints: Arc<Vec<Url>>,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder over the given endpoints.
    pub fn new(client: Client, endpoints: Vec<Url>, timeout: Duration) -> Self {
        Self {
            client,
            endpoints: Arc::new(endpoints),
            timeout,
        }
    }

    /// Forward a webhook body to every configured endpoint.
    ///
    /// Dispatches one POST per endpoint in list order, carrying the original
    /// body bytes, signature, user agent, and content type. All forwards run
    /// concurrently; this returns once every forward has settled. Outcomes
    /// are returned in endpoint-list order.
    pub async fn fan_out(
        &self,
        body: &[u8],
        signature: &str,
        user_agent: &str,
        content_type: &str,
    ) -> Vec<ForwardOutcome> {
        let futures: Vec<_> = self
            .endpoints
            .iter()
            .map(|endpoint| self.forward_one(endpoint, body, signature, user_agent, content_type))
            .collect();

        join_all(futures).await
    }

    /// Forward to a single endpoint and record the outcome.
    async fn forward_one(
        &self,
        endpoint: &Url,
        body: &[u8],
        signature: &str,
        user_agent: &str,
        content_type: &str,
    ) -> ForwardOutcome {
        let result = self
            .client
            .post(endpoint.clone())
            .timeout(self.timeout)
            .header("Content-Type", content_type)
            .header("X-Line-Signature", signature)
            .header("User-Agent", user_agent)
            .body(body.to_vec())
            .send()
            .await;

        let result = match result {
            Ok(resp) => {
                let status = resp.status();
                info!(
                    endpoint = %endpoint,
                    status_code = status.as_u16(),
                    "webhook_forwarded"
                );
                if !status.is_success() {
                    warn!(
                        endpoint = %endpoint,
                        status_code = status.as_u16(),
                        "webhook_forward_non_success"
                    );
                }
                Ok(status)
            }
            Err(e) if e.is_timeout() => {
                warn!(
                    endpoint = %endpoint,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "webhook_forward_timeout"
                );
                Err(ForwardError::Timeout(self.timeout.as_millis() as u64))
            }
            Err(e) => {
                warn!(
                    endpoint = %endpoint,
                    error = %e,
                    "webhook_forward_error"
                );
                Err(ForwardError::Transport(e))
            }
        };

        ForwardOutcome {
            endpoint: endpoint.clone(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn forwarder(endpoints: Vec<Url>) -> Forwarder {
        Forwarder::new(Client::new(), endpoints, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fan_out_posts_to_every_endpoint() {
        let server_a = MockServer::start_async().await;
        let server_b = MockServer::start_async().await;

        let body = br#"{"events":[]}"#;

        let mock_a = server_a
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/webhook")
                    .header("content-type", "application/json")
                    .header("x-line-signature", "c2ln")
                    .header("user-agent", "LineBotWebhook/2.0")
                    .body(r#"{"events":[]}"#);
                then.status(200);
            })
            .await;
        let mock_b = server_b
            .mock_async(|when, then| {
                when.method(POST).path("/webhook").body(r#"{"events":[]}"#);
                then.status(200);
            })
            .await;

        let endpoints = vec![
            Url::parse(&server_a.url("/webhook")).unwrap(),
            Url::parse(&server_b.url("/webhook")).unwrap(),
        ];
        let outcomes = forwarder(endpoints.clone())
            .fan_out(body, "c2ln", "LineBotWebhook/2.0", "application/json")
            .await;

        mock_a.assert_async().await;
        mock_b.assert_async().await;

        // Outcomes come back in endpoint-list order
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].endpoint, endpoints[0]);
        assert_eq!(outcomes[1].endpoint, endpoints[1]);
        assert!(outcomes.iter().all(|o| o.is_success()));
    }

    #[tokio::test]
    async fn test_fan_out_failure_does_not_block_others() {
        let failing = MockServer::start_async().await;
        let healthy = MockServer::start_async().await;

        let failing_mock = failing
            .mock_async(|when, then| {
                when.method(POST).path("/webhook");
                then.status(500);
            })
            .await;
        let healthy_mock = healthy
            .mock_async(|when, then| {
                when.method(POST).path("/webhook");
                then.status(200);
            })
            .await;

        let endpoints = vec![
            Url::parse(&failing.url("/webhook")).unwrap(),
            Url::parse(&healthy.url("/webhook")).unwrap(),
        ];
        let outcomes = forwarder(endpoints)
            .fan_out(b"payload", "sig", "", "application/json")
            .await;

        failing_mock.assert_async().await;
        healthy_mock.assert_async().await;

        assert!(!outcomes[0].is_success());
        assert!(matches!(&outcomes[0].result, Ok(status) if status.as_u16() == 500));
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_fan_out_unreachable_endpoint_is_transport_error() {
        let healthy = MockServer::start_async().await;
        let healthy_mock = healthy
            .mock_async(|when, then| {
                when.method(POST).path("/webhook");
                then.status(200);
            })
            .await;

        // Reserved TEST-NET-1 address, nothing listens there
        let endpoints = vec![
            Url::parse("http://192.0.2.1:9/webhook").unwrap(),
            Url::parse(&healthy.url("/webhook")).unwrap(),
        ];
        let outcomes = Forwarder::new(Client::new(), endpoints, Duration::from_millis(500))
            .fan_out(b"payload", "sig", "", "application/json")
            .await;

        healthy_mock.assert_async().await;

        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_fan_out_timeout_is_reported() {
        let slow = MockServer::start_async().await;
        slow.mock_async(|when, then| {
            when.method(POST).path("/webhook");
            then.status(200).delay(Duration::from_secs(5));
        })
        .await;

        let endpoints = vec![Url::parse(&slow.url("/webhook")).unwrap()];
        let outcomes = Forwarder::new(Client::new(), endpoints, Duration::from_millis(100))
            .fan_out(b"payload", "sig", "", "application/json")
            .await;

        assert!(matches!(
            &outcomes[0].result,
            Err(ForwardError::Timeout(100))
        ));
    }

    #[tokio::test]
    async fn test_fan_out_no_endpoints() {
        let outcomes = forwarder(Vec::new())
            .fan_out(b"payload", "sig", "", "application/json")
            .await;
        assert!(outcomes.is_empty());
    }
}
