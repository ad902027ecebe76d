//! AI agent client
//!
//! Formats a task, resolves the unified agent endpoint and sends the
//! `{prompt, context, task, metadata}` body with bearer authentication.

use crate::formatter::PromptFormatter;
use crate::task::AiTask;
use serde_json::{Map, Value};
use socialdesk_core::{attach_metadata, AgentDefaults, Integration, InvocationResult, RequestMetadata};
use socialdesk_settings::SettingsResolver;
use socialdesk_webhook::{InvokeOptions, WebhookInvoker};
use std::sync::Arc;
use tracing::debug;

pub struct AiAgentClient {
    resolver: Arc<SettingsResolver>,
    invoker: WebhookInvoker,
    options: InvokeOptions,
}

impl AiAgentClient {
    pub fn new(
        resolver: Arc<SettingsResolver>,
        invoker: WebhookInvoker,
        defaults: &AgentDefaults,
    ) -> Self {
        Self {
            resolver,
            invoker,
            options: InvokeOptions::from_agent_defaults(defaults),
        }
    }

    pub fn options(&self) -> &InvokeOptions {
        &self.options
    }

    /// Run a task with the agent defaults
    pub async fn run(&self, task: &AiTask, data: &Value) -> InvocationResult {
        self.run_with(task, data, &self.options).await
    }

    pub async fn run_with(
        &self,
        task: &AiTask,
        data: &Value,
        options: &InvokeOptions,
    ) -> InvocationResult {
        let formatted = PromptFormatter::format(task, data);
        debug!(
            task = %task,
            prompt_len = formatted.prompt.len(),
            "Running AI agent task"
        );
        let body = agent_body(formatted.prompt, formatted.context, Some(task));
        self.dispatch(body, options).await
    }

    /// Send a hand-built prompt; the body carries no `task` field
    pub async fn run_prompt(&self, prompt: impl Into<String>, context: Value) -> InvocationResult {
        let body = agent_body(prompt.into(), context, None);
        self.dispatch(body, &self.options).await
    }

    pub async fn analyze_trends(&self, data: &Value) -> InvocationResult {
        self.run(&AiTask::TrendAnalysis, data).await
    }

    pub async fn analyze_account(&self, data: &Value) -> InvocationResult {
        self.run(&AiTask::AccountAnalysis, data).await
    }

    pub async fn generate_caption(&self, data: &Value) -> InvocationResult {
        self.run(&AiTask::CaptionGeneration, data).await
    }

    pub async fn suggest_hashtags(&self, data: &Value) -> InvocationResult {
        self.run(&AiTask::HashtagSuggestion, data).await
    }

    pub async fn analyze_sentiment(&self, data: &Value) -> InvocationResult {
        self.run(&AiTask::SentimentAnalysis, data).await
    }

    pub async fn compare_competitors(&self, data: &Value) -> InvocationResult {
        self.run(&AiTask::CompetitorComparison, data).await
    }

    async fn dispatch(&self, body: Value, options: &InvokeOptions) -> InvocationResult {
        let endpoint = self.resolver.resolve(Integration::AiAgent).await;
        self.invoker.send(&endpoint, body, options).await
    }
}

fn agent_body(prompt: String, context: Value, task: Option<&AiTask>) -> Value {
    let mut body = Map::new();
    body.insert("prompt".to_string(), Value::String(prompt));
    body.insert("context".to_string(), context);
    if let Some(task) = task {
        body.insert("task".to_string(), Value::String(task.as_str().to_string()));
    }
    attach_metadata(Value::Object(body), &RequestMetadata::now())
}
