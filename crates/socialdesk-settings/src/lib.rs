//! Endpoint settings resolution
//!
//! Resolves the URL and credential of each [`Integration`] from a layered
//! source:
//! - the remote settings store (one Supabase row holding a JSON blob),
//!   guarded by a short fetch timeout
//! - process environment variables, one per endpoint, as the fallback
//!
//! The resolved [`SettingsSnapshot`] is cached process-wide for a fixed TTL.
//! Remote failures never propagate out of [`SettingsResolver::resolve`]; they
//! are logged and degrade to the environment values.
//!
//! # Example
//!
//! ```rust,ignore
//! use socialdesk_core::{AppConfig, Integration};
//! use socialdesk_settings::SettingsResolver;
//!
//! let config = AppConfig::load()?;
//! let resolver = SettingsResolver::from_config(&config.settings)?;
//!
//! let endpoint = resolver.resolve(Integration::Analytics).await;
//! if !endpoint.is_configured() {
//!     // reported as `NotConfigured` by the webhook invoker
//! }
//! ```
//!
//! [`Integration`]: socialdesk_core::Integration

pub mod cache;
pub mod record;
pub mod resolver;
pub mod store;

pub use cache::*;
pub use record::*;
pub use resolver::*;
pub use store::*;

use thiserror::Error;

/// Settings store errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings store not configured")]
    StoreNotConfigured,

    #[error("Settings record not found")]
    RecordNotFound,

    #[error("Settings fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Settings store returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Malformed settings record: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SettingsError {
    fn from(e: reqwest::Error) -> Self {
        SettingsError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SettingsError>;
