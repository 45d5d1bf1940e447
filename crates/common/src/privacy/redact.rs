//! Header redaction
//!
//! `Authorization` is redacted unconditionally, whatever its scheme. The
//! other entries cover credential-bearing headers a host might forward.

use std::collections::BTreeMap;

/// Placeholder written in place of a sensitive value
pub const REDACTED: &str = "[REDACTED]";

const SENSITIVE_HEADERS: &[&str] =
    &["authorization", "proxy-authorization", "cookie", "set-cookie", "x-api-key"];

/// Returns `true` when the header carries a credential (case-insensitive)
#[must_use]
pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Copy a header map, replacing sensitive values with [`REDACTED`]
pub fn sanitize_headers<I, K, V>(headers: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    headers
        .into_iter()
        .map(|(name, value)| {
            let name = name.as_ref().to_string();
            let value = if is_sensitive_header(&name) {
                REDACTED.to_string()
            } else {
                value.as_ref().to_string()
            };
            (name, value)
        })
        .collect()
}
