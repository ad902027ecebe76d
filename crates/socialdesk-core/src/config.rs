use crate::telemetry::TelemetryConfig;
use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub webhook: WebhookDefaults,
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub settings: SettingsStoreConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `.env` and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from_env("SOCIALDESK")
    }

    /// Load configuration from environment with custom prefix.
    ///
    /// Keys use `__` between sections, e.g. `SOCIALDESK_WEBHOOK__TIMEOUT_MS`.
    pub fn load_from_env(prefix: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load configuration from file with environment overrides
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let builder = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("SOCIALDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("webhook.timeout_ms", default_webhook_timeout_ms())?
            .set_default("webhook.retries", default_webhook_retries())?
            .set_default("webhook.retry_delay_ms", default_retry_delay_ms())?
            .set_default("agent.timeout_ms", default_agent_timeout_ms())?
            .set_default("agent.retries", default_agent_retries())?
            .set_default("agent.retry_delay_ms", default_retry_delay_ms())?
            .set_default("settings.supabase_url", "")?
            .set_default("settings.table", default_settings_table())?
            .set_default("settings.key", default_settings_key())?
            .set_default("settings.fetch_timeout_ms", default_fetch_timeout_ms())?
            .set_default("settings.cache_ttl_ms", default_cache_ttl_ms())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webhook: WebhookDefaults::default(),
            agent: AgentDefaults::default(),
            settings: SettingsStoreConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Call defaults for generic workflow webhooks
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookDefaults {
    #[serde(default = "default_webhook_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_webhook_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl WebhookDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for WebhookDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: default_webhook_timeout_ms(),
            retries: default_webhook_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Call defaults for the AI agent webhook; AI workloads are slower
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_agent_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_agent_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl AgentDefaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            timeout_ms: default_agent_timeout_ms(),
            retries: default_agent_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Remote settings store (Supabase) location and cache behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsStoreConfig {
    /// Project URL; empty disables the remote store
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub service_key: Option<SecretString>,
    #[serde(default = "default_settings_table")]
    pub table: String,
    /// Well-known row key holding the integrations blob
    #[serde(default = "default_settings_key")]
    pub key: String,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

impl SettingsStoreConfig {
    pub fn with_supabase(mut self, url: impl Into<String>, service_key: impl Into<String>) -> Self {
        self.supabase_url = url.into();
        self.service_key = Some(SecretString::new(service_key.into()));
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn is_remote_enabled(&self) -> bool {
        !self.supabase_url.trim().is_empty()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for SettingsStoreConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            service_key: None,
            table: default_settings_table(),
            key: default_settings_key(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

fn default_webhook_timeout_ms() -> u64 {
    30_000
}

fn default_webhook_retries() -> u32 {
    3
}

fn default_agent_timeout_ms() -> u64 {
    60_000
}

fn default_agent_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_settings_table() -> String {
    "app_settings".to_string()
}

fn default_settings_key() -> String {
    "integrations".to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    1_500
}

fn default_cache_ttl_ms() -> u64 {
    300_000 // 5 minutes
}
