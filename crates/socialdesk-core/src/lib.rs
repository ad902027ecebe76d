//! Core types for the SocialDesk integration layer
//!
//! Everything the settings resolver, the webhook invoker and the AI agent
//! client agree on lives here:
//! - [`Integration`] and [`EndpointConfig`]: the named outbound endpoints
//! - [`InvocationResult`] and [`InvocationError`]: the uniform call envelope
//! - [`RequestMetadata`]: the metadata block attached to every outbound body
//! - [`AppConfig`]: layered configuration loading
//! - [`telemetry`]: tracing subscriber setup
//!
//! # Example
//!
//! Startup of a service embedding the integration layer:
//!
//! ```rust,ignore
//! use socialdesk_core::{init_tracing, AppConfig};
//!
//! // SOCIALDESK_TELEMETRY__FORMAT=json, SOCIALDESK_WEBHOOK__RETRIES=5, ...
//! let config = AppConfig::load()?;
//! init_tracing(&config.telemetry)?;
//! ```

pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod metadata;
pub mod telemetry;

pub use config::*;
pub use endpoint::*;
pub use envelope::*;
pub use error::*;
pub use metadata::*;
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig, TelemetryError};
