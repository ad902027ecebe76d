//! Tracing setup
//!
//! Installs the global `tracing` subscriber that carries the structured
//! events of the resolver, the invoker and the AI agent client. `RUST_LOG`
//! takes precedence over the configured level.

use crate::metadata::{METADATA_SOURCE, METADATA_VERSION};
use serde::Deserialize;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {directive:?}: {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Tracing initialization failed: {0}")]
    TracingInit(String),
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for local runs
    #[default]
    Pretty,
    /// One JSON object per event with fields flattened, for log shipping
    Json,
}

/// Set with `SOCIALDESK_TELEMETRY__*` variables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub environment: String,
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info` or
    /// `socialdesk_webhook=debug,info`
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "socialdesk".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl TelemetryConfig {
    pub fn with_service_name(mut self, name: &str) -> Self {
        self.service_name = name.to_string();
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), &config.log_level)?;

    let (json, pretty) = match config.format {
        LogFormat::Json => (
            Some(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_target(true),
            ),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(true))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .map_err(|e| TelemetryError::TracingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        format = ?config.format,
        source = METADATA_SOURCE,
        payload_version = METADATA_VERSION,
        "Tracing initialized"
    );

    Ok(())
}

/// `RUST_LOG` when set and non-empty, otherwise the configured level
fn build_filter(rust_log: Option<&str>, fallback: &str) -> Result<EnvFilter, TelemetryError> {
    let directive = rust_log
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(fallback);

    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}
