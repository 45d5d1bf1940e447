//! Access/refresh token pair and its cache representation

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{GlueError, Result};

/// Token pair as parsed from an `access-tokens` / `refresh-tokens` response
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds as reported by the server
    pub expires_in: u64,
}

impl TokenGrant {
    /// Parse `data.attributes.{accessToken, refreshToken, expiresIn}`.
    ///
    /// `expiresIn` may arrive as a number or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns `GlueError::InvalidResponse` naming every missing field.
    pub fn from_json_api(response: &Value) -> Result<Self> {
        let attributes = response.pointer("/data/attributes");

        let access_token = attributes
            .and_then(|a| a.get("accessToken"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let refresh_token = attributes
            .and_then(|a| a.get("refreshToken"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let expires_in = attributes.and_then(|a| a.get("expiresIn")).and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        match (access_token, refresh_token, expires_in) {
            (Some(access), Some(refresh), Some(expires_in)) => Ok(Self {
                access_token: access.to_string(),
                refresh_token: refresh.to_string(),
                expires_in,
            }),
            (access, refresh, expires) => {
                let missing: Vec<&str> = [
                    access.is_none().then_some("accessToken"),
                    refresh.is_none().then_some("refreshToken"),
                    expires.is_none().then_some("expiresIn"),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(GlueError::InvalidResponse(format!(
                    "token response is missing {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Convert to a cache entry issued at `issued_at_ms`.
    ///
    /// `expires_at = issued_at + expires_in * 1000 - safety_margin`
    pub fn into_cached(self, issued_at_ms: u64, safety_margin_ms: u64) -> CachedToken {
        let expires_at = issued_at_ms
            .saturating_add(self.expires_in.saturating_mul(1_000))
            .saturating_sub(safety_margin_ms);

        CachedToken {
            access_token: self.access_token,
            refresh_token: Some(self.refresh_token),
            issued_at: issued_at_ms,
            expires_at,
        }
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant").field("expires_in", &self.expires_in).finish_non_exhaustive()
    }
}

/// Cached token entry; replaced wholesale, never mutated in place
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Milliseconds since the UNIX epoch when the grant was received
    #[serde(default)]
    pub issued_at: u64,
    /// Milliseconds since the UNIX epoch, safety margin already subtracted
    pub expires_at: u64,
}

impl CachedToken {
    /// Still usable at `now_ms`
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at
    }

    /// Expired, or expiring within `window_ms` of `now_ms`.
    ///
    /// Tokens whose whole usable lifetime fits inside the window are only
    /// due once they expire; otherwise they would be refreshed on every use.
    pub fn needs_refresh_at(&self, now_ms: u64, window_ms: u64) -> bool {
        if !self.is_valid_at(now_ms) {
            return true;
        }
        let lifetime = self.expires_at.saturating_sub(self.issued_at);
        lifetime > window_ms && now_ms.saturating_add(window_ms) >= self.expires_at
    }

    /// Refresh token, if one was issued
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("has_refresh_token", &self.refresh_token().is_some())
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
