//! Settings record, environment source and resolved snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use socialdesk_core::{EndpointConfig, Integration};
use std::collections::HashMap;
use std::fmt;

/// JSON blob stored under the well-known settings key
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    pub ai_agent_url: Option<String>,
    pub ai_agent_token: Option<String>,
    pub content_scheduling_url: Option<String>,
    pub analytics_url: Option<String>,
    pub comments_url: Option<String>,
    pub reports_url: Option<String>,
    pub competitors_url: Option<String>,
    pub notifications_url: Option<String>,
}

impl SettingsRecord {
    pub fn url(&self, integration: Integration) -> Option<&str> {
        let value = match integration {
            Integration::AiAgent => &self.ai_agent_url,
            Integration::ContentScheduling => &self.content_scheduling_url,
            Integration::Analytics => &self.analytics_url,
            Integration::Comments => &self.comments_url,
            Integration::Reports => &self.reports_url,
            Integration::Competitors => &self.competitors_url,
            Integration::Notifications => &self.notifications_url,
        };
        non_empty(value.as_deref())
    }

    pub fn credential(&self, integration: Integration) -> Option<&str> {
        match integration {
            Integration::AiAgent => non_empty(self.ai_agent_token.as_deref()),
            _ => None,
        }
    }

    pub fn with_url(mut self, integration: Integration, url: impl Into<String>) -> Self {
        let url = Some(url.into());
        match integration {
            Integration::AiAgent => self.ai_agent_url = url,
            Integration::ContentScheduling => self.content_scheduling_url = url,
            Integration::Analytics => self.analytics_url = url,
            Integration::Comments => self.comments_url = url,
            Integration::Reports => self.reports_url = url,
            Integration::Competitors => self.competitors_url = url,
            Integration::Notifications => self.notifications_url = url,
        }
        self
    }

    pub fn with_ai_agent_token(mut self, token: impl Into<String>) -> Self {
        self.ai_agent_token = Some(token.into());
        self
    }
}

impl fmt::Debug for SettingsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsRecord")
            .field("ai_agent_url", &self.ai_agent_url)
            .field(
                "ai_agent_token",
                &self.ai_agent_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("content_scheduling_url", &self.content_scheduling_url)
            .field("analytics_url", &self.analytics_url)
            .field("comments_url", &self.comments_url)
            .field("reports_url", &self.reports_url)
            .field("competitors_url", &self.competitors_url)
            .field("notifications_url", &self.notifications_url)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Source of environment variable values
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Where a snapshot's values primarily came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    Remote,
    Environment,
}

/// Immutable view of every endpoint configuration at one point in time
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    endpoints: HashMap<Integration, EndpointConfig>,
    fetched_at: DateTime<Utc>,
    source: SettingsSource,
}

impl SettingsSnapshot {
    /// Build from environment variables only
    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self::build(None, env, SettingsSource::Environment)
    }

    /// Build from a remote record; fields missing from the record fall back
    /// to the environment individually
    pub fn from_record(record: &SettingsRecord, env: &dyn EnvSource) -> Self {
        Self::build(Some(record), env, SettingsSource::Remote)
    }

    fn build(record: Option<&SettingsRecord>, env: &dyn EnvSource, source: SettingsSource) -> Self {
        let env_value = |name: &str| {
            env.var(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let endpoints = Integration::ALL
            .iter()
            .map(|&integration| {
                let url = record
                    .and_then(|r| r.url(integration))
                    .map(str::to_string)
                    .or_else(|| env_value(integration.url_env_var()))
                    .unwrap_or_default();

                let credential = record
                    .and_then(|r| r.credential(integration))
                    .map(str::to_string)
                    .or_else(|| integration.credential_env_var().and_then(|name| env_value(name)));

                let mut endpoint = EndpointConfig::new(integration, url);
                if let Some(token) = credential {
                    endpoint = endpoint.with_credential(token);
                }
                (integration, endpoint)
            })
            .collect();

        Self {
            endpoints,
            fetched_at: Utc::now(),
            source,
        }
    }

    /// Endpoint for an integration; unconfigured when nothing was found
    pub fn endpoint(&self, integration: Integration) -> EndpointConfig {
        self.endpoints
            .get(&integration)
            .cloned()
            .unwrap_or_else(|| EndpointConfig::unconfigured(integration))
    }

    /// Integrations with a usable URL (and credential where required)
    pub fn configured(&self) -> Vec<Integration> {
        Integration::ALL
            .iter()
            .copied()
            .filter(|i| self.endpoints.get(i).is_some_and(|e| e.is_configured()))
            .collect()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn source(&self) -> SettingsSource {
        self.source
    }
}
