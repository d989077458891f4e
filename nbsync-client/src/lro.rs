//! Long-running operation executor
//!
//! The service answers slow calls with `202 Accepted` and a `Location` header
//! pointing at an operation-state resource. That resource keeps handing out a
//! `Location` while the operation runs; once it points at `.../result` the
//! payload can be fetched from there.

use reqwest::{Method, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::WorkspaceClient;
use crate::error::{ClientError, Result};

/// Default sleep between two polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Suffix of the location serving an operation's payload
const RESULT_SUFFIX: &str = "/result";

impl WorkspaceClient {
    /// Issues a request and follows the long-running-operation protocol
    ///
    /// Uses the client's configured poll interval. See
    /// [`WorkspaceClient::execute_with_interval`].
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
    ) -> Result<JsonValue> {
        self.execute_with_interval(method, path, body, self.poll_interval)
            .await
    }

    /// Issues a request and follows the long-running-operation protocol
    ///
    /// # Arguments
    /// * `method` - `GET` or `POST`
    /// * `path` - Request path relative to the service base URL
    /// * `body` - JSON body, only allowed with `POST`
    /// * `poll_interval` - Sleep before each poll
    ///
    /// # Returns
    /// The JSON body of a non-`202` response, or of the operation's `/result`
    /// location. When the service stops handing out locations without reaching
    /// `/result`, the last operation-state document is returned instead.
    ///
    /// # Errors
    /// `InvalidRequest` before any I/O for an unsupported method or a body on a
    /// non-`POST` request. Transport, status and JSON errors propagate as-is;
    /// nothing is retried and the number of polls is unbounded.
    pub async fn execute_with_interval(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        poll_interval: Duration,
    ) -> Result<JsonValue> {
        validate_request(&method, body)?;

        let response = self.transport.send(method, path, body).await?;
        if response.status != StatusCode::ACCEPTED {
            return Self::handle_response(response);
        }

        let mut location = response
            .location
            .filter(|location| !location.is_empty())
            .ok_or_else(|| {
                ClientError::Protocol(format!(
                    "202 Accepted for {} without a Location header",
                    path
                ))
            })?;

        debug!("Operation accepted for {}, polling {}", path, location);

        loop {
            tokio::time::sleep(poll_interval).await;

            let response = self.transport.send(Method::GET, &location, None).await?;
            if !response.status.is_success() {
                return Self::handle_response(response);
            }

            let next = response.location.clone().filter(|next| !next.is_empty());
            match next {
                Some(next) if next.ends_with(RESULT_SUFFIX) => {
                    debug!("Operation completed, fetching {}", next);
                    let result = self.transport.send(Method::GET, &next, None).await?;
                    return Self::handle_response(result);
                }
                Some(next) => {
                    debug!("Operation still running, next poll at {}", next);
                    location = next;
                }
                None => {
                    debug!("Operation at {} ended without a result location", location);
                    return Self::handle_response(response);
                }
            }
        }
    }
}

/// Rejects requests the executor does not support
fn validate_request(method: &Method, body: Option<&JsonValue>) -> Result<()> {
    if *method != Method::GET && *method != Method::POST {
        return Err(ClientError::InvalidRequest(format!(
            "Unsupported method {}, only GET and POST are allowed",
            method
        )));
    }

    if body.is_some() && *method != Method::POST {
        return Err(ClientError::InvalidRequest(
            "Only method POST is supported with a body".to_string(),
        ));
    }

    Ok(())
}
