//! Scripted in-memory transport for tests

use crate::transport::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

/// What the transport does for one call
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Respond { status: u16, body: String },
    Fail(TransportError),
    /// Never completes; only the invoker's timeout ends the call
    Hang,
}

impl ScriptedReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self::Respond {
            status,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            body: body.to_string(),
        }
    }

    pub fn refused() -> Self {
        Self::Fail(TransportError::Connection("connection refused".to_string()))
    }
}

/// Replays a script of replies in order, repeating the last one once the
/// script runs out, and records every request it receives
pub struct RecordingTransport {
    script: Mutex<VecDeque<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl RecordingTransport {
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always(reply: ScriptedReply) -> Self {
        Self::new(vec![reply])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().last().cloned()
    }

    fn next_reply(&self) -> ScriptedReply {
        let mut last = self.last.lock();
        match self.script.lock().pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last
                .clone()
                .unwrap_or_else(|| ScriptedReply::text(500, "empty script")),
        }
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn post_json(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request.clone());

        match self.next_reply() {
            ScriptedReply::Respond { status, body } => Ok(TransportResponse { status, body }),
            ScriptedReply::Fail(error) => Err(error),
            ScriptedReply::Hang => std::future::pending().await,
        }
    }
}
