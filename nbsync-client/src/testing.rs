//! Scripted transport for tests.
//!
//! [`ScriptedTransport`] replays canned responses per `(method, target)` in the
//! order they were queued and records every request it receives, so tests can
//! assert on call counts as well as on results.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use crate::error::{ClientError, Result};
use crate::transport::{RawResponse, Transport};

/// A request as seen by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub target: String,
    pub body: Option<JsonValue>,
}

/// Transport replaying queued responses
///
/// A request without a queued response fails with a 404 API error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<(Method, String), VecDeque<RawResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` for the next `method` request to `target`
    pub fn respond(&self, method: Method, target: impl Into<String>, response: RawResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, target.into()))
            .or_default()
            .push_back(response);
    }

    /// Queues a `200 OK` JSON response
    pub fn respond_json(&self, method: Method, target: impl Into<String>, body: JsonValue) {
        self.respond(method, target, RawResponse::json(StatusCode::OK, &body));
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests sent to `target`
    pub fn requests_to(&self, target: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.target == target)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<&JsonValue>,
    ) -> Result<RawResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method: method.clone(),
                target: target.to_string(),
                body: body.cloned(),
            });

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&(method.clone(), target.to_string()))
            .and_then(VecDeque::pop_front);

        next.ok_or_else(|| {
            ClientError::api_error(404, format!("no scripted response for {} {}", method, target))
        })
    }
}
