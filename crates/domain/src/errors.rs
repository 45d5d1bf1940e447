//! Error types used throughout the node

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of errors for retry logic and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or malformed configuration / credentials - never retried
    Configuration,
    /// Token acquisition or authenticated retry failed
    Authentication,
    /// Response was missing required fields
    InvalidResponse,
    /// 4xx other than auth and rate limiting, or bad node parameters
    Client,
    /// 429
    RateLimit,
    /// Connection refused, timeout, reset, DNS failure
    Network,
    /// 5xx
    Server,
    /// Anything not otherwise classified
    Unknown,
}

/// Main error type for the Glue node
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum GlueError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {message}")]
    Authentication { message: String, attempts: u32 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection reset: {0}")]
    ConnectionReset(String),

    #[error("DNS lookup failed: {0}")]
    DnsFailure(String),

    #[error("API returned errors: {0}")]
    Api(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Request failed: {message}")]
    RequestFailed { message: String, status: Option<u16> },
}

impl GlueError {
    /// Authentication failure after `attempts` tries
    pub fn authentication(message: impl Into<String>, attempts: u32) -> Self {
        Self::Authentication { message: message.into(), attempts }
    }

    /// Unclassified request failure
    pub fn request_failed(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::RequestFailed { message: message.into(), status }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::InvalidResponse(_) => ErrorCategory::InvalidResponse,
            Self::Forbidden(_)
            | Self::NotFound(_)
            | Self::Validation(_)
            | Self::Api(_)
            | Self::InvalidParameter(_) => ErrorCategory::Client,
            Self::RateLimited(_) => ErrorCategory::RateLimit,
            Self::ConnectionRefused(_)
            | Self::Timeout(_)
            | Self::ConnectionReset(_)
            | Self::DnsFailure(_) => ErrorCategory::Network,
            Self::RequestFailed { status: Some(status), .. } if *status >= 500 => {
                ErrorCategory::Server
            }
            Self::RequestFailed { .. } => ErrorCategory::Unknown,
        }
    }

    /// Transient failures are worth another attempt after a backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Stable label suitable for structured logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Authentication { .. } => "authentication",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::RateLimited(_) => "rate_limited",
            Self::ConnectionRefused(_) => "connection_refused",
            Self::Timeout(_) => "timeout",
            Self::ConnectionReset(_) => "connection_reset",
            Self::DnsFailure(_) => "dns_failure",
            Self::Api(_) => "api",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::RequestFailed { .. } => "request_failed",
        }
    }
}

/// Result type alias for Glue operations
pub type Result<T> = std::result::Result<T, GlueError>;
