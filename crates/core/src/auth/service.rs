//! Token lifecycle: acquire, cache, refresh and retry
//!
//! `get_valid_access_token` resolves a token in this order:
//!
//! 1. cached and outside the refresh window: returned as is
//! 2. cached with a refresh token: refreshed; a failed refresh deletes the
//!    entry and falls through to a full authentication
//! 3. cached without a refresh token but not yet expired: returned as is
//! 4. otherwise: full username/password authentication
//!
//! The sequence runs inside a bounded retry loop that only retries transient
//! failures. Concurrent callers for the same cache key can share one
//! in-flight authentication (`coalesce_authentication`).

use std::sync::Arc;

use dashmap::DashMap;
use glue_common::{retry_with_policy, Backoff, RetryDecision, RetryFailure};
use glue_domain::constants::{
    ACCESS_TOKENS_ENDPOINT, ACCESS_TOKENS_TYPE, REFRESH_TOKENS_ENDPOINT, REFRESH_TOKENS_TYPE,
};
use glue_domain::{
    ClientConfig, Credentials, GlueError, RequestDescriptor, Result, TokenGrant,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::cache::{CacheStats, TokenCache};
use crate::ports::HttpTransport;
use crate::request::classify::classify;

/// Produces valid access tokens for credential sets
pub struct AuthService {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<TokenCache>,
    config: ClientConfig,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl AuthService {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cache: Arc<TokenCache>,
        config: ClientConfig,
    ) -> Self {
        Self { transport, cache, config, in_flight: DashMap::new() }
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Return a currently valid access token for `credentials`.
    ///
    /// # Errors
    ///
    /// - `GlueError::Config` for missing fields or a malformed base URL
    /// - `GlueError::InvalidResponse` when the token response lacks fields
    /// - `GlueError::Authentication` when acquisition failed, with the
    ///   number of attempts made
    #[instrument(skip_all, fields(base_url = %credentials.normalized_base_url()))]
    pub async fn get_valid_access_token(&self, credentials: &Credentials) -> Result<String> {
        validate_credentials(credentials)?;

        if let Some(token) = credentials.pre_issued_token() {
            debug!("using pre-issued access token");
            return Ok(token.to_string());
        }

        let key = credentials.cache_key();

        if !self.config.coalesce_authentication {
            return self.resolve_with_retry(credentials, &key).await;
        }

        let lock = Arc::clone(&self.in_flight.entry(key.clone()).or_default());
        let guard = lock.lock_owned().await;
        let result = self.resolve_with_retry(credentials, &key).await;
        drop(guard);
        self.in_flight.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    /// Drop every cached token
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("token cache cleared");
    }

    /// Drop the cached token of one credential set
    pub fn clear_entry(&self, base_url: &str, username: &str) -> bool {
        self.cache.delete(&glue_domain::types::credentials::cache_key(base_url, username))
    }

    /// Drop the cached token belonging to `credentials`
    pub fn invalidate(&self, credentials: &Credentials) -> bool {
        self.cache.delete(&credentials.cache_key())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn purge_expired(&self) -> usize {
        let removed = self.cache.purge_expired();
        if removed > 0 {
            debug!(removed, "purged expired tokens");
        }
        removed
    }

    async fn resolve_with_retry(&self, credentials: &Credentials, key: &str) -> Result<String> {
        let backoff = Backoff::exponential(self.config.auth_backoff_base());
        let policy = |error: &GlueError, attempt: u32| {
            if error.is_transient() {
                warn!(attempt, error = %error, "transient token acquisition failure");
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        };

        retry_with_policy(self.config.max_auth_attempts, &backoff, &policy, |_| {
            self.resolve_token(credentials, key)
        })
        .await
        .map_err(authentication_failure)
    }

    async fn resolve_token(&self, credentials: &Credentials, key: &str) -> Result<String> {
        let now = self.cache.now_ms();

        if let Some(cached) = self.cache.get(key) {
            if !cached.needs_refresh_at(now, self.config.refresh_window_ms()) {
                debug!("token cache hit");
                return Ok(cached.access_token);
            }

            if let Some(refresh_token) = cached.refresh_token() {
                match self.refresh(credentials.normalized_base_url(), refresh_token).await {
                    Ok(grant) => return Ok(self.store(key, grant)),
                    Err(err) => {
                        warn!(error = %err, "token refresh failed, re-authenticating");
                        self.cache.delete(key);
                    }
                }
            } else if cached.is_valid_at(now) {
                debug!("token near expiry without refresh token, using it");
                return Ok(cached.access_token);
            }
        }

        let grant = self.authenticate(credentials).await?;
        Ok(self.store(key, grant))
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<TokenGrant> {
        let body = json!({
            "data": {
                "type": ACCESS_TOKENS_TYPE,
                "attributes": {
                    "username": credentials.username.as_deref().unwrap_or_default(),
                    "password": credentials.password.as_deref().unwrap_or_default(),
                }
            }
        });

        info!("requesting new access token");
        self.request_grant(credentials.normalized_base_url(), ACCESS_TOKENS_ENDPOINT, body).await
    }

    async fn refresh(&self, base_url: &str, refresh_token: &str) -> Result<TokenGrant> {
        let body = json!({
            "data": {
                "type": REFRESH_TOKENS_TYPE,
                "attributes": { "refreshToken": refresh_token }
            }
        });

        debug!("refreshing access token");
        self.request_grant(base_url, REFRESH_TOKENS_ENDPOINT, body).await
    }

    async fn request_grant(&self, base_url: &str, endpoint: &str, body: Value) -> Result<TokenGrant> {
        let request = RequestDescriptor::post(format!("{base_url}{endpoint}"), body)
            .with_timeout(self.config.timeout())
            .with_tls_leniency(self.config.follow_redirects, self.config.accept_invalid_certs);

        let response =
            self.transport.perform(request).await.map_err(|err| classify(&err, endpoint))?;

        TokenGrant::from_json_api(&response)
    }

    // Nothing is written to the cache until the grant is complete, so an
    // abandoned attempt leaves the cache untouched.
    fn store(&self, key: &str, grant: TokenGrant) -> String {
        let cached = grant.into_cached(self.cache.now_ms(), self.config.safety_margin_ms);
        let access_token = cached.access_token.clone();
        debug!(expires_at = cached.expires_at, "caching access token");
        self.cache.set(key, cached);
        access_token
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Check required fields and the base URL shape
///
/// # Errors
///
/// Returns `GlueError::Config` naming the missing fields or the bad URL.
pub fn validate_credentials(credentials: &Credentials) -> Result<()> {
    let missing = credentials.missing_fields();
    if !missing.is_empty() {
        return Err(GlueError::Config(format!(
            "Missing required credential field(s): {}",
            missing.join(", ")
        )));
    }

    let base_url = credentials.normalized_base_url();
    match Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(GlueError::Config(format!("Invalid base URL: '{base_url}'"))),
    }
}

fn authentication_failure(failure: RetryFailure<GlueError>) -> GlueError {
    let attempts = failure.attempts;
    match failure.error {
        err @ (GlueError::Config(_) | GlueError::InvalidResponse(_)) => err,
        GlueError::Authentication { message, .. } => GlueError::authentication(message, attempts),
        other => GlueError::authentication(
            format!("Failed to obtain access token after {attempts} attempt(s): {other}"),
            attempts,
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glue_common::{Clock, MockClock};
    use glue_domain::{network_codes, CachedToken, HttpMethod, TransportError};

    use super::*;
    use crate::testing::{token_response, MockTransport};

    const BASE: &str = "https://glue.example.com";

    struct Fixture {
        transport: Arc<MockTransport>,
        clock: MockClock,
        service: Arc<AuthService>,
    }

    fn fixture(config: ClientConfig) -> Fixture {
        let transport = Arc::new(MockTransport::new());
        let clock = MockClock::new();
        let cache = Arc::new(TokenCache::with_clock(Arc::new(clock.clone())));
        let service = Arc::new(AuthService::new(
            Arc::clone(&transport) as Arc<dyn HttpTransport>,
            cache,
            config.without_backoff(),
        ));
        Fixture { transport, clock, service }
    }

    fn credentials() -> Credentials {
        Credentials::password(BASE, "alice", "secret")
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let f = fixture(ClientConfig::default());
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));

        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a1");
        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a1");

        assert_eq!(f.transport.request_count(), 1);
        let request = &f.transport.requests()[0];
        assert_eq!(request.url, "https://glue.example.com/access-tokens");
        assert_eq!(request.body.as_ref().unwrap()["data"]["attributes"]["username"], "alice");
        assert!(request.follow_redirects);
        assert!(request.accept_invalid_certs);
    }

    #[tokio::test]
    async fn short_lived_token_is_cached_until_it_expires() {
        let f = fixture(ClientConfig::default());
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 300)));
        f.transport.on(HttpMethod::Post, "/refresh-tokens", Ok(token_response("a2", "r2", 300)));

        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a1");
        f.clock.advance(Duration::from_secs(200));
        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a1");
        assert_eq!(f.transport.request_count(), 1);

        // 300s lifetime - 60s margin
        f.clock.advance(Duration::from_secs(40));
        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a2");
        assert_eq!(f.transport.count(HttpMethod::Post, "/refresh-tokens"), 1);
    }

    #[tokio::test]
    async fn cached_expiry_applies_safety_margin() {
        let f = fixture(ClientConfig::default());
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));
        let issued_at = f.clock.millis_since_epoch();

        f.service.get_valid_access_token(&credentials()).await.unwrap();

        let cached = f.service.cache().get("https://glue.example.com:alice").unwrap();
        assert_eq!(cached.expires_at, issued_at + 3_600_000 - 60_000);
    }

    #[tokio::test]
    async fn token_near_expiry_is_refreshed() {
        let f = fixture(ClientConfig::default());
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 600)));
        f.transport.on(HttpMethod::Post, "/refresh-tokens", Ok(token_response("a2", "r2", 600)));

        f.service.get_valid_access_token(&credentials()).await.unwrap();
        // 600s lifetime - 60s margin leaves 540s; inside the 300s window after 4 minutes
        f.clock.advance(Duration::from_secs(240));

        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a2");
        assert_eq!(f.transport.count(HttpMethod::Post, "/refresh-tokens"), 1);
        let refresh = f.transport.last_request("/refresh-tokens").unwrap();
        assert_eq!(refresh.body.unwrap()["data"]["attributes"]["refreshToken"], "r1");
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_full_authentication() {
        let f = fixture(ClientConfig::default());
        f.service.cache().set(
            "https://glue.example.com:alice",
            CachedToken {
                access_token: "stale".into(),
                refresh_token: Some("r-stale".into()),
                issued_at: 0,
                expires_at: f.clock.millis_since_epoch() - 1,
            },
        );
        f.transport.on(
            HttpMethod::Post,
            "/refresh-tokens",
            Err(TransportError::status(401, "Unauthorized")),
        );
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("fresh", "r", 3600)));

        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "fresh");
        assert_eq!(f.transport.count(HttpMethod::Post, "/refresh-tokens"), 1);
        assert_eq!(f.transport.count(HttpMethod::Post, "/access-tokens"), 1);
        assert_eq!(
            f.service.cache().get("https://glue.example.com:alice").unwrap().access_token,
            "fresh"
        );
    }

    #[tokio::test]
    async fn near_expiry_token_without_refresh_token_is_still_used() {
        let f = fixture(ClientConfig::default());
        f.service.cache().set(
            "https://glue.example.com:alice",
            CachedToken {
                access_token: "still-good".into(),
                refresh_token: None,
                issued_at: 0,
                expires_at: f.clock.millis_since_epoch() + 10_000,
            },
        );

        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "still-good");
        assert_eq!(f.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_then_succeed() {
        let f = fixture(ClientConfig::default());
        f.transport.on(
            HttpMethod::Post,
            "/access-tokens",
            Err(TransportError::network(network_codes::TIMED_OUT, "timed out")),
        );
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));

        assert_eq!(f.service.get_valid_access_token(&credentials()).await.unwrap(), "a1");
        assert_eq!(f.transport.count(HttpMethod::Post, "/access-tokens"), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_report_attempt_count() {
        let f = fixture(ClientConfig::default());
        f.transport.on(
            HttpMethod::Post,
            "/access-tokens",
            Err(TransportError::network(network_codes::CONNECTION_REFUSED, "refused")),
        );

        let err = f.service.get_valid_access_token(&credentials()).await.unwrap_err();

        match err {
            GlueError::Authentication { message, attempts } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("Connection refused"), "{message}");
            }
            other => panic!("expected Authentication, got {other:?}"),
        }
        assert_eq!(f.transport.count(HttpMethod::Post, "/access-tokens"), 3);
    }

    #[tokio::test]
    async fn rejected_credentials_are_not_retried() {
        let f = fixture(ClientConfig::default());
        f.transport.on(
            HttpMethod::Post,
            "/access-tokens",
            Err(TransportError::status(401, "Unauthorized")),
        );

        let err = f.service.get_valid_access_token(&credentials()).await.unwrap_err();

        assert!(matches!(err, GlueError::Authentication { attempts: 1, .. }));
        assert_eq!(f.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn incomplete_token_response_is_invalid() {
        let f = fixture(ClientConfig::default());
        f.transport.on(
            HttpMethod::Post,
            "/access-tokens",
            Ok(json!({ "data": { "attributes": { "accessToken": "a1" } } })),
        );

        let err = f.service.get_valid_access_token(&credentials()).await.unwrap_err();

        assert!(matches!(err, GlueError::InvalidResponse(_)));
        assert!(f.service.cache().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_fail_before_any_request() {
        let f = fixture(ClientConfig::default());
        let credentials = Credentials { base_url: BASE.into(), ..Credentials::default() };

        let err = f.service.get_valid_access_token(&credentials).await.unwrap_err();

        assert_eq!(
            err,
            GlueError::Config("Missing required credential field(s): username, password".into())
        );
        assert_eq!(f.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn malformed_base_url_is_configuration_error() {
        let f = fixture(ClientConfig::default());
        let credentials = Credentials::password("glue.example.com", "alice", "secret");

        let err = f.service.get_valid_access_token(&credentials).await.unwrap_err();

        assert!(matches!(err, GlueError::Config(message) if message.contains("Invalid base URL")));
    }

    #[tokio::test]
    async fn pre_issued_token_skips_authentication() {
        let f = fixture(ClientConfig::default());
        let credentials = Credentials::token(BASE, "issued-elsewhere");

        assert_eq!(
            f.service.get_valid_access_token(&credentials).await.unwrap(),
            "issued-elsewhere"
        );
        assert_eq!(f.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_authentication() {
        let f = fixture(ClientConfig::default());
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));
        f.transport.set_delay(Duration::from_millis(20));

        let calls = (0..5).map(|_| {
            let service = Arc::clone(&f.service);
            async move { service.get_valid_access_token(&credentials()).await }
        });
        let tokens = futures::future::join_all(calls).await;

        assert!(tokens.iter().all(|t| t.as_deref() == Ok("a1")));
        assert_eq!(f.transport.request_count(), 1);
        assert!(f.service.in_flight.is_empty());
    }

    #[tokio::test]
    async fn administrative_operations() {
        let f = fixture(ClientConfig::default());
        f.transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));
        f.service.get_valid_access_token(&credentials()).await.unwrap();

        assert_eq!(f.service.cache_stats().valid, 1);
        assert!(f.service.clear_entry("https://glue.example.com/", "alice"));
        assert!(f.service.cache().is_empty());

        f.service.get_valid_access_token(&credentials()).await.unwrap();
        f.clock.advance(Duration::from_secs(3600));
        assert_eq!(f.service.cache_stats().expired, 1);
        assert_eq!(f.service.purge_expired(), 1);

        f.service.get_valid_access_token(&credentials()).await.unwrap();
        f.service.clear_cache();
        assert_eq!(f.service.cache_stats().total, 0);
    }
}
