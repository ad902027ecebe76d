//! Metadata block attached to every outbound webhook body

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source tag identifying this application to the receiving workflows
pub const METADATA_SOURCE: &str = "socialdesk-crm";

/// Payload contract version
pub const METADATA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// ISO-8601 timestamp with millisecond precision
    pub timestamp: String,
    pub source: String,
    pub version: String,
}

impl RequestMetadata {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: METADATA_SOURCE.to_string(),
            version: METADATA_VERSION.to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        map.insert("source".into(), Value::String(self.source.clone()));
        map.insert("version".into(), Value::String(self.version.clone()));
        Value::Object(map)
    }
}

/// Merge `metadata` into an object payload, or wrap any other payload as
/// `{"data": payload, "metadata": ..}`
pub fn attach_metadata(payload: Value, metadata: &RequestMetadata) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.insert("metadata".into(), metadata.to_value());
            Value::Object(map)
        }
        other => {
            let mut map = Map::new();
            map.insert("data".into(), other);
            map.insert("metadata".into(), metadata.to_value());
            Value::Object(map)
        }
    }
}
