//! Credentials supplied by the host for one API instance

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity (base URL + username), secret (password) and an optional
/// pre-issued access token.
///
/// `Debug` never prints the password or the token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Credentials {
    /// Username/password credentials
    pub fn password(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            access_token: None,
        }
    }

    /// Credentials carrying an already issued bearer token
    pub fn token(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            access_token: Some(access_token.into()),
        }
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Cache key: `baseUrl:username`
    pub fn cache_key(&self) -> String {
        cache_key(self.normalized_base_url(), self.username.as_deref().unwrap_or_default())
    }

    /// Names of required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.trim().is_empty() {
            missing.push("baseUrl");
        }
        if self.pre_issued_token().is_none() {
            if is_blank(self.username.as_deref()) {
                missing.push("username");
            }
            if is_blank(self.password.as_deref()) {
                missing.push("password");
            }
        }
        missing
    }

    /// The pre-issued token, used only when username/password are absent
    pub fn pre_issued_token(&self) -> Option<&str> {
        let has_login = !is_blank(self.username.as_deref()) && !is_blank(self.password.as_deref());
        match self.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() && !has_login => Some(token),
            _ => None,
        }
    }
}

/// Cache key for a base URL / username pair
pub fn cache_key(base_url: &str, username: &str) -> String {
    format!("{}:{}", base_url.trim().trim_end_matches('/'), username)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
