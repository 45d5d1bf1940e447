//! Transport failure classification
//!
//! Maps host transport failures (HTTP status and/or network code) onto
//! [`GlueError`] variants with a human-readable cause. Secrets never reach
//! these messages: only the status, the network code, the request path and
//! the server's own error detail are used.

use glue_domain::network_codes::{
    CONNECTION_REFUSED, CONNECTION_RESET, LOOKUP_AGAIN, NOT_FOUND, SOCKET_TIMED_OUT, TIMED_OUT,
};
use glue_domain::{GlueError, TransportError};
use serde_json::Value;

/// Classify a failed call to `target` (a URL or endpoint path)
pub fn classify(error: &TransportError, target: &str) -> GlueError {
    let target = strip_query(target);

    if let Some(status) = error.status_code {
        let detail = error.body.as_ref().and_then(first_error_detail);
        return match status {
            401 => GlueError::authentication(
                format!("Invalid credentials or expired token ({target})"),
                1,
            ),
            403 => GlueError::Forbidden(format!(
                "Access to {target} was denied{}",
                suffix(detail.as_deref())
            )),
            404 => GlueError::NotFound(format!("Endpoint not found: {target}")),
            422 => GlueError::Validation(detail.unwrap_or_else(|| error.message.clone())),
            429 => GlueError::RateLimited(
                "Too many requests, wait before retrying".to_string(),
            ),
            _ => GlueError::request_failed(
                format!("{target} returned {status}: {}", detail.unwrap_or_else(|| error.message.clone())),
                Some(status),
            ),
        };
    }

    match error.code.as_deref() {
        Some(CONNECTION_REFUSED) => {
            GlueError::ConnectionRefused(format!("Could not connect to {target}"))
        }
        Some(TIMED_OUT | SOCKET_TIMED_OUT) => {
            GlueError::Timeout(format!("No response from {target} in time"))
        }
        Some(CONNECTION_RESET) => {
            GlueError::ConnectionReset(format!("Connection to {target} was reset"))
        }
        Some(NOT_FOUND | LOOKUP_AGAIN) => {
            GlueError::DnsFailure(format!("Could not resolve host for {target}"))
        }
        _ => GlueError::request_failed(error.message.clone(), None),
    }
}

/// Failures the executor retries with backoff: 429, timeouts and resets
pub fn is_retryable(error: &TransportError) -> bool {
    if error.status_code == Some(429) {
        return true;
    }
    matches!(error.code.as_deref(), Some(TIMED_OUT | SOCKET_TIMED_OUT | CONNECTION_RESET))
}

/// `errors[0].detail` (or `title`) of a JSON:API error document
pub fn first_error_detail(body: &Value) -> Option<String> {
    error_details(body).into_iter().next()
}

/// Every `detail` (falling back to `title`) in a JSON:API `errors` array
pub fn error_details(body: &Value) -> Vec<String> {
    body.get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| {
                    e.get("detail").or_else(|| e.get("title")).and_then(Value::as_str)
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn strip_query(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

fn suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(": {d}")).unwrap_or_default()
}
