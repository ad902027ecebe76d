//! Uniform success/failure envelope returned by every outbound call

use crate::error::InvocationError;
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use tracing::warn;

/// Outcome of one logical outbound call.
///
/// Callers branch on the variant before touching `data`; a failure is never
/// fatal and is expected to be replaced by a locally computed default (see
/// [`InvocationResult::or_fallback`]).
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Success {
        data: Value,
        status_code: u16,
    },
    Failure {
        error: InvocationError,
        status_code: Option<u16>,
    },
}

impl InvocationResult {
    pub fn success(data: Value, status_code: u16) -> Self {
        Self::Success { data, status_code }
    }

    /// Build a failure; the status code is taken from the error
    pub fn failure(error: InvocationError) -> Self {
        let status_code = error.status_code();
        Self::Failure { error, status_code }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } => Some(*status_code),
            Self::Failure { status_code, .. } => *status_code,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&InvocationError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, InvocationError> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { error, .. } => Err(error),
        }
    }

    /// Deserialize the success payload into a typed response
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, InvocationError> {
        match self {
            Self::Success { data, status_code } => serde_json::from_value(data).map_err(|e| {
                InvocationError::MalformedResponse {
                    status: status_code,
                    message: e.to_string(),
                }
            }),
            Self::Failure { error, .. } => Err(error),
        }
    }

    pub fn unwrap_or(self, default: Value) -> Value {
        self.into_result().unwrap_or(default)
    }

    pub fn unwrap_or_else<F>(self, fallback: F) -> Value
    where
        F: FnOnce(&InvocationError) -> Value,
    {
        match self {
            Self::Success { data, .. } => data,
            Self::Failure { error, .. } => fallback(&error),
        }
    }

    /// Substitute a locally computed value on failure, logging the failure
    pub fn or_fallback<F>(self, operation: &str, fallback: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        match self {
            Self::Success { data, .. } => data,
            Self::Failure { error, status_code } => {
                warn!(
                    operation = %operation,
                    error_kind = error.kind(),
                    status = ?status_code,
                    error = %error,
                    "Outbound call failed, using local fallback"
                );
                fallback()
            }
        }
    }
}

impl From<InvocationError> for InvocationResult {
    fn from(error: InvocationError) -> Self {
        Self::failure(error)
    }
}

impl Serialize for InvocationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("InvocationResult", 3)?;
        match self {
            Self::Success { data, status_code } => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
                state.serialize_field("statusCode", status_code)?;
            }
            Self::Failure { error, status_code } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", &error.to_string())?;
                match status_code {
                    Some(code) => state.serialize_field("statusCode", code)?,
                    None => state.skip_field("statusCode")?,
                }
            }
        }
        state.end()
    }
}
