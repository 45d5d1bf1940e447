use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use glue_core::HttpTransport;
use glue_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use glue_domain::{network_codes, GlueError, HttpMethod, RequestDescriptor, TransportError};
use once_cell::sync::OnceCell;
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, Method, Response};
use serde_json::Value;
use tracing::debug;

const MAX_REDIRECTS: usize = 10;

/// `HttpTransport` backed by reqwest.
///
/// Each request descriptor chooses whether redirects are followed and
/// whether invalid certificates are accepted; one client is built lazily
/// per combination. Retries are left to the caller.
pub struct ReqwestTransport {
    clients: [OnceCell<ReqwestClient>; 4],
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    fn client(&self, follow_redirects: bool, accept_invalid_certs: bool) -> Result<&ReqwestClient, GlueError> {
        let slot = (usize::from(follow_redirects) << 1) | usize::from(accept_invalid_certs);
        self.clients[slot].get_or_try_init(|| {
            let redirect =
                if follow_redirects { Policy::limited(MAX_REDIRECTS) } else { Policy::none() };
            let mut builder = ReqwestClient::builder()
                .connect_timeout(self.connect_timeout)
                .redirect(redirect)
                .no_proxy();

            if let Some(agent) = &self.user_agent {
                builder = builder.user_agent(agent.clone());
            }

            if accept_invalid_certs {
                builder = builder.danger_accept_invalid_certs(true);
            }

            builder.build().map_err(|err| GlueError::Config(format!("failed to build HTTP client: {err}")))
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn perform(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        let client = self
            .client(request.follow_redirects, request.accept_invalid_certs)
            .map_err(|err| TransportError { status_code: None, code: None, message: err.to_string(), body: None })?;

        let mut builder = client.request(to_method(request.method), &request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %request.url, "sending HTTP request");
        let response = builder.send().await.map_err(|err| map_reqwest_error(&err))?;
        let status = response.status();
        debug!(method = %request.method, url = %request.url, %status, "received HTTP response");

        let body = read_body(response).await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("HTTP error")
        );
        let error = TransportError::status(status.as_u16(), message);
        Err(match body {
            Value::Null => error,
            body => error.with_body(body),
        })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: Some(format!("glue-node/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl ReqwestTransportBuilder {
    /// Upper bound for establishing a connection; the overall request
    /// timeout comes from each descriptor.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> ReqwestTransport {
        ReqwestTransport {
            clients: Default::default(),
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent,
        }
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

// Empty bodies become `Null`; non-JSON bodies are kept as a string.
async fn read_body(response: Response) -> Result<Value, TransportError> {
    let text = response.text().await.map_err(|err| map_reqwest_error(&err))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

fn map_reqwest_error(err: &reqwest::Error) -> TransportError {
    let message = describe(err);
    if err.is_timeout() {
        return TransportError::network(network_codes::TIMED_OUT, message);
    }
    if let Some(code) = network_code(err) {
        return TransportError::network(code, message);
    }
    TransportError { status_code: None, code: None, message, body: None }
}

fn network_code(err: &reqwest::Error) -> Option<&'static str> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return Some(network_codes::CONNECTION_REFUSED),
                io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => {
                    return Some(network_codes::CONNECTION_RESET)
                }
                io::ErrorKind::TimedOut => return Some(network_codes::TIMED_OUT),
                _ => {}
            }
        }
        let text = cause.to_string().to_ascii_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return Some(network_codes::NOT_FOUND);
        }
        source = cause.source();
    }

    err.is_connect().then_some(network_codes::CONNECTION_REFUSED)
}

fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
