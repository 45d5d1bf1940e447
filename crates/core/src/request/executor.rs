//! Authenticated request execution
//!
//! One logical API call: attach a bearer token, perform the request, retry
//! 429 / timeout / connection reset with exponential backoff, and on a 401
//! invalidate the cached token, re-authenticate and retry exactly once.

use std::sync::Arc;

use glue_common::{retry_with_policy, sanitize_headers, Backoff, RetryDecision};
use glue_domain::{ClientConfig, Credentials, GlueError, RequestDescriptor, Result, TransportError};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::classify::{classify, is_retryable};
use crate::auth::AuthService;
use crate::ports::HttpTransport;

/// Executes requests with authentication attached
pub struct RequestExecutor {
    auth: Arc<AuthService>,
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
}

impl RequestExecutor {
    pub fn new(auth: Arc<AuthService>, transport: Arc<dyn HttpTransport>) -> Self {
        let config = auth.config().clone();
        Self { auth, transport, config }
    }

    pub fn auth(&self) -> &Arc<AuthService> {
        &self.auth
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Perform `request` on behalf of `credentials` and return the body.
    ///
    /// # Errors
    ///
    /// - errors from [`AuthService::get_valid_access_token`]
    /// - `GlueError::Authentication` ("Request failed after retry") when the
    ///   request still fails after re-authenticating on a 401
    /// - the classified transport failure otherwise
    #[instrument(
        skip_all,
        fields(request_id = %Uuid::new_v4(), method = %request.method, url = %request.url)
    )]
    pub async fn execute(
        &self,
        credentials: &Credentials,
        request: RequestDescriptor,
    ) -> Result<Value> {
        let mut request = request
            .with_timeout(self.config.timeout())
            .with_tls_leniency(self.config.follow_redirects, self.config.accept_invalid_certs);

        let token = self.auth.get_valid_access_token(credentials).await?;
        request.set_bearer_token(&token);

        match self.perform(&request).await {
            Ok(body) => Ok(body),
            Err(err) if err.is_unauthorized() => {
                warn!("request rejected with 401, re-authenticating once");
                self.auth.invalidate(credentials);

                let token = self.auth.get_valid_access_token(credentials).await?;
                request.set_bearer_token(&token);

                self.perform(&request).await.map_err(|retry_err| {
                    let cause = classify(&retry_err, &request.url);
                    GlueError::authentication(format!("Request failed after retry: {cause}"), 2)
                })
            }
            Err(err) => Err(classify(&err, &request.url)),
        }
    }

    async fn perform(&self, request: &RequestDescriptor) -> std::result::Result<Value, TransportError> {
        let backoff = Backoff::exponential(self.config.retry_backoff_base());
        let policy = |error: &TransportError, attempt: u32| {
            if is_retryable(error) {
                warn!(
                    attempt,
                    status = error.status_code,
                    code = error.code.as_deref(),
                    "transient request failure"
                );
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        };

        retry_with_policy(self.config.max_transient_retries + 1, &backoff, &policy, |attempt| {
            debug!(
                attempt,
                headers = ?sanitize_headers(&request.headers),
                "sending request"
            );
            self.transport.perform(request.clone())
        })
        .await
        .map_err(|failure| failure.error)
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").field("config", &self.config).finish_non_exhaustive()
    }
}
