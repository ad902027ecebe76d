//! Outbound integration points and their endpoint configuration.

use crate::error::InvocationError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical integration points backed by an external workflow webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    /// Unified AI agent workflow (trends, captions, hashtags, ...)
    AiAgent,
    /// Post scheduling and publishing
    ContentScheduling,
    /// Instagram account analytics sync
    Analytics,
    /// Comment moderation and replies
    Comments,
    /// Report generation
    Reports,
    /// Competitor tracking
    Competitors,
    /// Outbound notifications (email, chat)
    Notifications,
}

impl Integration {
    pub const ALL: [Integration; 7] = [
        Integration::AiAgent,
        Integration::ContentScheduling,
        Integration::Analytics,
        Integration::Comments,
        Integration::Reports,
        Integration::Competitors,
        Integration::Notifications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiAgent => "ai_agent",
            Self::ContentScheduling => "content_scheduling",
            Self::Analytics => "analytics",
            Self::Comments => "comments",
            Self::Reports => "reports",
            Self::Competitors => "competitors",
            Self::Notifications => "notifications",
        }
    }

    /// Environment variable holding the webhook URL when the settings store
    /// has no value
    pub fn url_env_var(&self) -> &'static str {
        match self {
            Self::AiAgent => "N8N_AI_AGENT_URL",
            Self::ContentScheduling => "N8N_CONTENT_SCHEDULING_URL",
            Self::Analytics => "N8N_ANALYTICS_URL",
            Self::Comments => "N8N_COMMENTS_URL",
            Self::Reports => "N8N_REPORTS_URL",
            Self::Competitors => "N8N_COMPETITORS_URL",
            Self::Notifications => "N8N_NOTIFICATIONS_URL",
        }
    }

    /// Environment variable holding the bearer token, for integrations that
    /// authenticate
    pub fn credential_env_var(&self) -> Option<&'static str> {
        match self {
            Self::AiAgent => Some("N8N_AI_AGENT_TOKEN"),
            _ => None,
        }
    }

    pub fn requires_credential(&self) -> bool {
        self.credential_env_var().is_some()
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL and optional bearer credential for one integration point.
///
/// An empty URL is a valid value meaning "not configured"; it is reported by
/// [`EndpointConfig::ensure_configured`] rather than at resolution time.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub integration: Integration,
    pub url: String,
    pub credential: Option<SecretString>,
}

impl EndpointConfig {
    pub fn new(integration: Integration, url: impl Into<String>) -> Self {
        Self {
            integration,
            url: url.into(),
            credential: None,
        }
    }

    pub fn unconfigured(integration: Integration) -> Self {
        Self::new(integration, String::new())
    }

    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(SecretString::new(token.into()));
        self
    }

    /// Non-empty bearer token, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.credential
            .as_ref()
            .map(|secret| secret.expose_secret().trim())
            .filter(|token| !token.is_empty())
    }

    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn is_configured(&self) -> bool {
        self.ensure_configured().is_ok()
    }

    /// Check the URL and, where the integration needs one, the credential
    pub fn ensure_configured(&self) -> Result<(), InvocationError> {
        if !self.has_url() {
            return Err(InvocationError::NotConfigured(format!(
                "{} webhook URL is not configured",
                self.integration
            )));
        }
        if self.integration.requires_credential() && self.bearer_token().is_none() {
            return Err(InvocationError::NotConfigured(format!(
                "{} token is not configured",
                self.integration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_names() {
        assert_eq!(Integration::AiAgent.as_str(), "ai_agent");
        assert_eq!(Integration::ContentScheduling.to_string(), "content_scheduling");
        assert_eq!(
            serde_json::to_string(&Integration::Comments).unwrap(),
            "\"comments\""
        );
    }

    #[test]
    fn test_only_ai_agent_requires_credential() {
        for integration in Integration::ALL {
            assert_eq!(
                integration.requires_credential(),
                integration == Integration::AiAgent
            );
        }
    }

    #[test]
    fn test_empty_url_is_not_configured() {
        let endpoint = EndpointConfig::new(Integration::Analytics, "   ");
        let err = endpoint.ensure_configured().unwrap_err();

        assert!(matches!(err, InvocationError::NotConfigured(_)));
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_ai_agent_needs_token() {
        let endpoint = EndpointConfig::new(Integration::AiAgent, "https://n8n.example.com/webhook/ai");
        assert!(!endpoint.is_configured());

        let endpoint = endpoint.with_credential("  ");
        assert!(!endpoint.is_configured());

        let endpoint = EndpointConfig::new(Integration::AiAgent, "https://n8n.example.com/webhook/ai")
            .with_credential("tok_123");
        assert!(endpoint.is_configured());
        assert_eq!(endpoint.bearer_token(), Some("tok_123"));
    }

    #[test]
    fn test_generic_endpoint_without_token() {
        let endpoint = EndpointConfig::new(Integration::Reports, "https://n8n.example.com/webhook/reports");
        assert!(endpoint.is_configured());
        assert_eq!(endpoint.bearer_token(), None);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let endpoint = EndpointConfig::new(Integration::AiAgent, "https://n8n.example.com")
            .with_credential("super-secret");
        assert!(!format!("{:?}", endpoint).contains("super-secret"));
    }
}
