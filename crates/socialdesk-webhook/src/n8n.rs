//! Typed calls to the n8n workflow webhooks
//!
//! Each call resolves its endpoint through the settings resolver and goes
//! through the invoker with the generic webhook defaults, so a failure always
//! comes back as an `InvocationResult` the caller can fall back on.

use crate::invoker::{InvokeOptions, WebhookInvoker};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use socialdesk_core::{Integration, InvocationError, InvocationResult, WebhookDefaults};
use socialdesk_settings::SettingsResolver;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Connectivity checks are answered quickly or not at all
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Post to publish through the scheduling workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub account_id: String,
    pub caption: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_post_type")]
    pub post_type: String,
}

fn default_post_type() -> String {
    "feed".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub account_id: String,
    pub report_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default = "default_report_format")]
    pub format: String,
}

fn default_report_format() -> String {
    "pdf".to_string()
}

/// Client for every generic workflow integration
pub struct N8nClient {
    resolver: Arc<SettingsResolver>,
    invoker: WebhookInvoker,
    options: InvokeOptions,
}

impl N8nClient {
    pub fn new(
        resolver: Arc<SettingsResolver>,
        invoker: WebhookInvoker,
        defaults: &WebhookDefaults,
    ) -> Self {
        Self {
            resolver,
            invoker,
            options: InvokeOptions::from_webhook_defaults(defaults),
        }
    }

    pub fn options(&self) -> &InvokeOptions {
        &self.options
    }

    /// Send `payload` to an integration with the default options
    pub async fn trigger(&self, integration: Integration, payload: Value) -> InvocationResult {
        self.trigger_with(integration, payload, &self.options).await
    }

    pub async fn trigger_with(
        &self,
        integration: Integration,
        payload: Value,
        options: &InvokeOptions,
    ) -> InvocationResult {
        let endpoint = self.resolver.resolve(integration).await;
        debug!(integration = %integration, configured = endpoint.is_configured(), "Triggering workflow");
        self.invoker.invoke(&endpoint, payload, options).await
    }

    /// Single short attempt to check an integration is reachable
    pub async fn ping(&self, integration: Integration) -> InvocationResult {
        let options = self
            .options
            .clone()
            .with_timeout(PING_TIMEOUT)
            .with_retries(1);
        self.trigger_with(integration, json!({"action": "ping"}), &options)
            .await
    }

    pub async fn schedule_content(&self, post: &ScheduledPost) -> InvocationResult {
        match action_payload("schedule_post", post) {
            Ok(payload) => self.trigger(Integration::ContentScheduling, payload).await,
            Err(e) => e.into(),
        }
    }

    pub async fn sync_analytics(&self, account_id: &str) -> InvocationResult {
        self.trigger(
            Integration::Analytics,
            json!({"action": "sync_analytics", "accountId": account_id}),
        )
        .await
    }

    pub async fn reply_to_comment(&self, comment_id: &str, reply: &str) -> InvocationResult {
        self.trigger(
            Integration::Comments,
            json!({"action": "reply", "commentId": comment_id, "message": reply}),
        )
        .await
    }

    pub async fn generate_report(&self, request: &ReportRequest) -> InvocationResult {
        match action_payload("generate_report", request) {
            Ok(payload) => self.trigger(Integration::Reports, payload).await,
            Err(e) => e.into(),
        }
    }

    pub async fn track_competitor(&self, username: &str) -> InvocationResult {
        let username = username.trim_start_matches('@');
        self.trigger(
            Integration::Competitors,
            json!({"action": "track_competitor", "username": username}),
        )
        .await
    }

    pub async fn notify(&self, channel: &str, message: &str) -> InvocationResult {
        self.trigger(
            Integration::Notifications,
            json!({"action": "notify", "channel": channel, "message": message}),
        )
        .await
    }
}

/// Serialize `body` and tag it with an `action` field
fn action_payload<T: Serialize>(action: &str, body: &T) -> Result<Value, InvocationError> {
    let mut value = serde_json::to_value(body)
        .map_err(|e| InvocationError::InvalidPayload(e.to_string()))?;
    if let Value::Object(map) = &mut value {
        map.insert("action".to_string(), Value::String(action.to_string()));
    }
    Ok(value)
}
