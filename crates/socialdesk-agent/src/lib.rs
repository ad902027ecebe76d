//! AI agent integration for SocialDesk
//!
//! Every AI feature (trend analysis, captions, hashtags, sentiment, ...) goes
//! through one unified n8n agent webhook. Callers name an [`AiTask`] and hand
//! over structured data; [`PromptFormatter`] turns that into the
//! `{prompt, context}` pair the workflow expects and [`AiAgentClient`] sends
//! it with bearer authentication.
//!
//! # Example
//!
//! ```rust,ignore
//! use socialdesk_agent::{AiAgentClient, AiTask};
//! use serde_json::json;
//!
//! let caption = agent
//!     .run(&AiTask::CaptionGeneration, &json!({"topic": "new summer menu", "tone": "playful"}))
//!     .await
//!     .or_fallback("generate_caption", || json!({"caption": "Summer is here!"}));
//! ```

pub mod client;
pub mod formatter;
pub mod task;

pub use client::*;
pub use formatter::*;
pub use task::*;
