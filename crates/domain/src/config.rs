//! Client configuration
//!
//! Every field has a default, so a partial JSON/TOML document (or none at
//! all) yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AUTH_BACKOFF_BASE_MS, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_AUTH_ATTEMPTS,
    MAX_TRANSIENT_RETRIES, RETRY_BACKOFF_BASE_MS, TOKEN_REFRESH_WINDOW_SECS,
    TOKEN_SAFETY_MARGIN_MS,
};

/// What to do with a response that carries no `data` member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPayloadPolicy {
    /// Return the raw response as a single record
    #[default]
    PassThrough,
    /// Raise `GlueError::Api` when the response carries an `errors` array
    Raise,
}

/// Configuration for token handling and outbound requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout applied to every outbound request
    pub timeout_secs: u64,
    /// Skip TLS certificate validation (self-hosted instances with
    /// self-signed certificates)
    pub accept_invalid_certs: bool,
    /// Follow HTTP redirects (token endpoints may bounce between http/https)
    pub follow_redirects: bool,
    /// Attempts for token acquisition / refresh
    pub max_auth_attempts: u32,
    /// Base delay of the token backoff (`base * 2^(attempt-1)`)
    pub auth_backoff_base_ms: u64,
    /// Refresh tokens this many seconds before they expire
    pub refresh_window_secs: u64,
    /// Subtracted from the server-reported token lifetime
    pub safety_margin_ms: u64,
    /// Extra attempts for 429 / timeout / connection reset on resource calls
    pub max_transient_retries: u32,
    /// Base delay of the resource request backoff
    pub retry_backoff_base_ms: u64,
    /// Share one in-flight authentication between concurrent callers
    pub coalesce_authentication: bool,
    /// Handling of responses without `data`
    pub error_payload_policy: ErrorPayloadPolicy,
    /// Page size used for offsets when the caller gives none
    pub default_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            accept_invalid_certs: true,
            follow_redirects: true,
            max_auth_attempts: MAX_AUTH_ATTEMPTS,
            auth_backoff_base_ms: AUTH_BACKOFF_BASE_MS,
            refresh_window_secs: TOKEN_REFRESH_WINDOW_SECS,
            safety_margin_ms: TOKEN_SAFETY_MARGIN_MS,
            max_transient_retries: MAX_TRANSIENT_RETRIES,
            retry_backoff_base_ms: RETRY_BACKOFF_BASE_MS,
            coalesce_authentication: true,
            error_payload_policy: ErrorPayloadPolicy::PassThrough,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn auth_backoff_base(&self) -> Duration {
        Duration::from_millis(self.auth_backoff_base_ms)
    }

    pub fn retry_backoff_base(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_base_ms)
    }

    pub fn refresh_window_ms(&self) -> u64 {
        self.refresh_window_secs.saturating_mul(1_000)
    }

    /// Same configuration without any backoff sleeps (tests, dry runs)
    #[must_use]
    pub fn without_backoff(mut self) -> Self {
        self.auth_backoff_base_ms = 0;
        self.retry_backoff_base_ms = 0;
        self
    }
}
