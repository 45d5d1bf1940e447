//! Composition root: the shared token cache and the services built on it

use std::sync::Arc;

use glue_core::{AuthService, CacheStats, HttpTransport, RequestExecutor, ResourceFactory, TokenCache};
use glue_domain::{ClientConfig, Result};
use glue_infra::{config, ReqwestTransport};
use tracing::info;

/// Holds every service the node needs.
///
/// One context is meant to live for the whole process so that all
/// executions share one token cache. Tests build a fresh context (and with
/// it a fresh cache) each time.
pub struct NodeContext {
    config: ClientConfig,
    cache: Arc<TokenCache>,
    auth: Arc<AuthService>,
    executor: Arc<RequestExecutor>,
    factory: ResourceFactory,
}

impl NodeContext {
    /// Context over `transport` with a new, empty cache
    pub fn new(transport: Arc<dyn HttpTransport>, config: ClientConfig) -> Self {
        Self::with_cache(transport, Arc::new(TokenCache::new()), config)
    }

    /// Context sharing an existing cache
    pub fn with_cache(
        transport: Arc<dyn HttpTransport>,
        cache: Arc<TokenCache>,
        config: ClientConfig,
    ) -> Self {
        let auth = Arc::new(AuthService::new(Arc::clone(&transport), Arc::clone(&cache), config.clone()));
        let executor = Arc::new(RequestExecutor::new(Arc::clone(&auth), transport));
        let factory = ResourceFactory::new(Arc::clone(&executor));

        Self { config, cache, auth, executor, factory }
    }

    /// Context over the reqwest transport with configuration from files and
    /// `GLUE_*` environment variables
    ///
    /// # Errors
    /// Returns `GlueError::Config` when the configuration cannot be loaded.
    pub fn from_env() -> Result<Self> {
        let config = config::load()?;
        info!(
            timeout_secs = config.timeout_secs,
            error_payload_policy = ?config.error_payload_policy,
            "node context configured"
        );
        Ok(Self::new(Arc::new(ReqwestTransport::new()), config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn factory(&self) -> &ResourceFactory {
        &self.factory
    }

    /// Explicit lifecycle hook for the host's shutdown path.
    ///
    /// Drops expired tokens and logs what remains. Safe to call more than
    /// once; the context stays usable afterwards.
    pub fn shutdown(&self) -> CacheStats {
        let purged = self.auth.purge_expired();
        let stats = self.auth.cache_stats();
        info!(purged, total = stats.total, valid = stats.valid, "node context shut down");
        stats
    }
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("config", &self.config)
            .field("cached_tokens", &self.cache.len())
            .finish_non_exhaustive()
    }
}
