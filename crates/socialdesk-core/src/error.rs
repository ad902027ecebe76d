use thiserror::Error;

/// Conventional client-timeout status reported for timed out calls
pub const TIMEOUT_STATUS_CODE: u16 = 408;

/// Failure modes of an outbound invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// URL or required credential missing; detected before any request
    #[error("{0}")]
    NotConfigured(String),

    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(String),

    /// Request body could not be encoded as JSON
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, DNS, TLS and similar
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response; `body` is the raw response text
    #[error("Webhook returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 2xx response whose body is not valid JSON
    #[error("Malformed response (HTTP {status}): {message}")]
    MalformedResponse { status: u16, message: String },
}

impl InvocationError {
    /// HTTP status associated with the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Timeout { .. } => Some(TIMEOUT_STATUS_CODE),
            Self::Rejected { status, .. } | Self::MalformedResponse { status, .. } => Some(*status),
            Self::NotConfigured(_)
            | Self::InvalidUrl(_)
            | Self::InvalidPayload(_)
            | Self::Transport(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Failures detected before a request is sent; never retried
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured(_) | Self::InvalidUrl(_) | Self::InvalidPayload(_)
        )
    }

    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::InvalidUrl(_) => "invalid_url",
            Self::InvalidPayload(_) => "invalid_payload",
            Self::Timeout { .. } => "timeout",
            Self::Transport(_) => "transport",
            Self::Rejected { .. } => "rejected",
            Self::MalformedResponse { .. } => "malformed_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(InvocationError::Timeout { timeout_ms: 10 }.status_code(), Some(408));
        assert_eq!(
            InvocationError::Rejected { status: 502, body: "bad gateway".into() }.status_code(),
            Some(502)
        );
        assert_eq!(InvocationError::Transport("refused".into()).status_code(), None);
        assert_eq!(InvocationError::NotConfigured("x".into()).status_code(), None);
    }

    #[test]
    fn test_rejected_message_keeps_body() {
        let err = InvocationError::Rejected { status: 500, body: "boom".into() };
        assert!(err.to_string().contains("boom"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_classification() {
        assert!(InvocationError::Timeout { timeout_ms: 1 }.is_timeout());
        assert!(InvocationError::InvalidUrl("nope".into()).is_precondition());
        assert!(!InvocationError::Transport("reset".into()).is_precondition());
        assert!(InvocationError::InvalidPayload("key must be a string".into()).is_precondition());
        assert_eq!(InvocationError::InvalidPayload("x".into()).status_code(), None);
        assert_eq!(
            InvocationError::MalformedResponse { status: 200, message: "eof".into() }.kind(),
            "malformed_response"
        );
    }
}
