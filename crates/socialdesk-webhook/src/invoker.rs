//! Webhook invoker
//!
//! Sends one logical request to a resolved endpoint and always comes back
//! with an [`InvocationResult`], whatever went wrong along the way.

use crate::{
    retry::{retry_with, RetryOn, RetryPolicy},
    transport::{HttpTransport, ReqwestTransport, TransportError, TransportRequest},
};
use serde_json::Value;
use socialdesk_core::{
    attach_metadata, AgentDefaults, EndpointConfig, InvocationError, InvocationResult,
    RequestMetadata, WebhookDefaults,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

/// Header carrying the invocation id; identical across retries
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Per-call options
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    /// Bound for each attempt (always > 0)
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub retry_on: RetryOn,
}

impl InvokeOptions {
    /// Generic workflow webhook: 30s, 3 attempts, 1s linear backoff, every
    /// failure retried
    pub fn webhook() -> Self {
        Self::from_webhook_defaults(&WebhookDefaults::default())
    }

    /// AI agent: 60s, 2 attempts, 1s linear backoff, timeouts not retried
    pub fn agent() -> Self {
        Self::from_agent_defaults(&AgentDefaults::default())
    }

    pub fn from_webhook_defaults(defaults: &WebhookDefaults) -> Self {
        Self {
            timeout: Duration::ZERO,
            retry: RetryPolicy::linear(defaults.retries, defaults.retry_delay()),
            retry_on: RetryOn::AnyFailure,
        }
        .with_timeout(defaults.timeout())
    }

    pub fn from_agent_defaults(defaults: &AgentDefaults) -> Self {
        Self {
            timeout: Duration::ZERO,
            retry: RetryPolicy::linear(defaults.retries, defaults.retry_delay()),
            retry_on: RetryOn::NonTimeout,
        }
        .with_timeout(defaults.timeout())
    }

    /// A zero timeout is raised to one millisecond
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(Duration::from_millis(1));
        self
    }

    /// Total attempts; values below 1 are raised to 1
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retry = self.retry.with_max_attempts(retries);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry = self.retry.with_base_delay(delay);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_retry_on(mut self, retry_on: RetryOn) -> Self {
        self.retry_on = retry_on;
        self
    }
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self::webhook()
    }
}

/// Performs outbound webhook calls over a pluggable transport
#[derive(Clone)]
pub struct WebhookInvoker {
    transport: Arc<dyn HttpTransport>,
}

impl WebhookInvoker {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Invoker over a default reqwest client
    pub fn with_reqwest() -> Result<Self, reqwest::Error> {
        Ok(Self::new(Arc::new(ReqwestTransport::new()?)))
    }

    /// Attach the metadata block to `payload` and send it
    pub async fn invoke(
        &self,
        endpoint: &EndpointConfig,
        payload: Value,
        options: &InvokeOptions,
    ) -> InvocationResult {
        let body = attach_metadata(payload, &RequestMetadata::now());
        self.send(endpoint, body, options).await
    }

    /// Send `body` as is
    pub async fn send(
        &self,
        endpoint: &EndpointConfig,
        body: Value,
        options: &InvokeOptions,
    ) -> InvocationResult {
        if let Err(e) = preflight(endpoint) {
            warn!(
                integration = %endpoint.integration,
                error = %e,
                "Skipping webhook call"
            );
            return InvocationResult::failure(e);
        }

        let request_id = Uuid::new_v4().to_string();
        let mut headers = vec![(REQUEST_ID_HEADER.to_string(), request_id.clone())];
        if let Some(token) = endpoint.bearer_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        let request = TransportRequest {
            url: endpoint.url.trim().to_string(),
            headers,
            body,
        };

        let started = Instant::now();
        let outcome = retry_with(
            &options.retry,
            |attempt| self.attempt(&request, &request_id, options.timeout, attempt),
            |e| options.retry_on.should_retry(e),
        )
        .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok((data, status_code)) => {
                info!(
                    integration = %endpoint.integration,
                    request_id = %request_id,
                    status = status_code,
                    elapsed_ms = elapsed_ms,
                    "Webhook call succeeded"
                );
                InvocationResult::success(data, status_code)
            }
            Err(e) => {
                error!(
                    integration = %endpoint.integration,
                    request_id = %request_id,
                    error_kind = e.kind(),
                    error = %e,
                    elapsed_ms = elapsed_ms,
                    "Webhook call failed"
                );
                InvocationResult::failure(e)
            }
        }
    }

    /// One attempt: bounded by `timeout`, response interpreted
    async fn attempt(
        &self,
        request: &TransportRequest,
        request_id: &str,
        timeout: Duration,
        attempt: u32,
    ) -> Result<(Value, u16), InvocationError> {
        let timeout_ms = timeout.as_millis() as u64;

        debug!(
            url = %request.url,
            request_id = %request_id,
            attempt = attempt,
            "Sending webhook request"
        );

        let response = match tokio::time::timeout(timeout, self.transport.post_json(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(TransportError::Timeout)) | Err(_) => {
                warn!(
                    url = %request.url,
                    request_id = %request_id,
                    attempt = attempt,
                    timeout_ms = timeout_ms,
                    "Webhook request timed out"
                );
                return Err(InvocationError::Timeout { timeout_ms });
            }
            Ok(Err(TransportError::Connection(message))) => {
                warn!(
                    url = %request.url,
                    request_id = %request_id,
                    attempt = attempt,
                    error = %message,
                    "Webhook request failed"
                );
                return Err(InvocationError::Transport(message));
            }
        };

        let status = response.status;
        if !(200..300).contains(&status) {
            warn!(
                url = %request.url,
                request_id = %request_id,
                attempt = attempt,
                status = status,
                "Webhook returned non-success response"
            );
            return Err(InvocationError::Rejected {
                status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body)
            .map(|data| (data, status))
            .map_err(|e| InvocationError::MalformedResponse {
                status,
                message: e.to_string(),
            })
    }
}

/// Checks that need no network: configuration and URL shape
fn preflight(endpoint: &EndpointConfig) -> Result<(), InvocationError> {
    endpoint.ensure_configured()?;

    let url = Url::parse(endpoint.url.trim())
        .map_err(|e| InvocationError::InvalidUrl(format!("{}: {}", endpoint.url, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(InvocationError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            endpoint.url, scheme
        ))),
    }
}
