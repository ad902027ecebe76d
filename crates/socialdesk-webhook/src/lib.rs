//! Outbound webhook invocation for SocialDesk
//!
//! This crate sends requests to external workflow-automation webhooks (n8n):
//! - Endpoint preconditions (URL, credential) checked before any request
//! - Per-attempt timeout enforced by dropping the in-flight request
//! - Bounded retry with linear backoff and an explicit retry predicate
//! - A uniform [`InvocationResult`] for every outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use socialdesk_core::{init_tracing, AppConfig};
//! use socialdesk_settings::SettingsResolver;
//! use socialdesk_webhook::{N8nClient, WebhookInvoker};
//! use std::sync::Arc;
//!
//! let config = AppConfig::load()?;
//! init_tracing(&config.telemetry)?;
//! let resolver = Arc::new(SettingsResolver::from_config(&config.settings)?);
//! let client = N8nClient::new(resolver, WebhookInvoker::with_reqwest()?, &config.webhook);
//!
//! let stats = client
//!     .sync_analytics("ig_account_1")
//!     .await
//!     .or_fallback("sync_analytics", || serde_json::json!({"followers": 0}));
//! ```
//!
//! [`InvocationResult`]: socialdesk_core::InvocationResult

pub mod invoker;
pub mod n8n;
pub mod retry;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use invoker::*;
pub use n8n::*;
pub use retry::*;
pub use transport::*;
