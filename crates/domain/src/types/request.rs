//! Transport-level request and failure types
//!
//! These mirror the host transport contract: a request descriptor goes in,
//! a JSON body or a `TransportError` comes out.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, JSON_CONTENT_TYPE};

/// Network error codes reported by the transport
pub mod network_codes {
    pub const CONNECTION_REFUSED: &str = "ECONNREFUSED";
    pub const TIMED_OUT: &str = "ETIMEDOUT";
    pub const SOCKET_TIMED_OUT: &str = "ESOCKETTIMEDOUT";
    pub const CONNECTION_RESET: &str = "ECONNRESET";
    pub const NOT_FOUND: &str = "ENOTFOUND";
    pub const LOOKUP_AGAIN: &str = "EAI_AGAIN";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request; built per call and never stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub accept_invalid_certs: bool,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), JSON_CONTENT_TYPE.to_string());

        Self {
            method,
            url: url.into(),
            headers,
            body: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            follow_redirects: false,
            accept_invalid_certs: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// POST with a JSON body and matching `Content-Type`
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(HttpMethod::Post, url);
        request.headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        request.body = Some(body);
        request
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set (or replace) `Authorization: Bearer <token>`
    pub fn set_bearer_token(&mut self, token: &str) {
        self.headers.insert("Authorization".to_string(), format!("Bearer {token}"));
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.set_bearer_token(token);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Redirect following and certificate leniency for self-hosted instances
    #[must_use]
    pub fn with_tls_leniency(mut self, follow_redirects: bool, accept_invalid_certs: bool) -> Self {
        self.follow_redirects = follow_redirects;
        self.accept_invalid_certs = accept_invalid_certs;
        self
    }
}

/// Failure reported by the transport: an HTTP status, a network code, or both
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct TransportError {
    pub status_code: Option<u16>,
    pub code: Option<String>,
    pub message: String,
    /// Parsed error body, when the server sent one
    pub body: Option<Value>,
}

impl TransportError {
    /// HTTP-level failure
    pub fn status(status_code: u16, message: impl Into<String>) -> Self {
        Self { status_code: Some(status_code), code: None, message: message.into(), body: None }
    }

    /// Network-level failure identified by a code from [`network_codes`]
    pub fn network(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status_code: None, code: Some(code.into()), message: message.into(), body: None }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }
}
