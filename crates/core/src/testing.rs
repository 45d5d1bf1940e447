//! Test doubles for the host ports
//!
//! [`MockTransport`] answers requests from per-route response queues and
//! records everything it receives. [`StaticHost`] serves parameters and
//! credentials from memory.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use glue_domain::{Credentials, GlueError, HttpMethod, RequestDescriptor, Result, TransportError};
use serde_json::{json, Map, Value};

use crate::ports::{HttpTransport, NodeHost};

type Reply = std::result::Result<Value, TransportError>;

/// JSON:API token response body
pub fn token_response(access_token: &str, refresh_token: &str, expires_in: u64) -> Value {
    json!({
        "data": {
            "type": "access-tokens",
            "id": null,
            "attributes": {
                "tokenType": "Bearer",
                "expiresIn": expires_in,
                "accessToken": access_token,
                "refreshToken": refresh_token
            }
        }
    })
}

/// Scripted transport keyed by method and URL path
///
/// Replies queued for a route are consumed in order; the last one keeps
/// answering once the queue is down to it. Unknown routes get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RequestDescriptor>>,
    delay: Mutex<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`
    pub fn on(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Sleep this long before answering each request
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Requests received for `method path`
    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method && path_of(&r.url) == path).count()
    }

    /// Most recent request to `path`
    pub fn last_request(&self, path: &str) -> Option<RequestDescriptor> {
        self.requests().into_iter().rev().find(|r| path_of(&r.url) == path)
    }

    fn next_reply(&self, method: HttpMethod, path: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => {
                queue.pop_front().unwrap_or_else(|| Err(TransportError::status(500, "empty")))
            }
            Some(queue) => {
                queue.front().cloned().unwrap_or_else(|| Err(TransportError::status(500, "empty")))
            }
            None => Err(TransportError::status(404, format!("no route for {method} {path}"))),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn perform(&self, request: RequestDescriptor) -> Reply {
        let delay = *self.delay.lock().unwrap_or_else(PoisonError::into_inner);
        let method = request.method;
        let path = path_of(&request.url).to_string();
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.next_reply(method, &path)
    }
}

fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme.find('/').map_or("/", |idx| &without_scheme[idx..]);
    path.split_once('?').map_or(path, |(path, _)| path)
}

/// In-memory workflow host
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    items: Vec<Map<String, Value>>,
    credentials: Option<Credentials>,
    continue_on_failure: bool,
}

impl StaticHost {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials: Some(credentials), ..Self::default() }
    }

    /// Host that has no credentials configured
    pub fn without_credentials() -> Self {
        Self::default()
    }

    /// Add an input item; `parameters` must be a JSON object
    #[must_use]
    pub fn with_item(mut self, parameters: Value) -> Self {
        let parameters = match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.items.push(parameters);
        self
    }

    #[must_use]
    pub fn with_continue_on_failure(mut self, enabled: bool) -> Self {
        self.continue_on_failure = enabled;
        self
    }
}

#[async_trait]
impl NodeHost for StaticHost {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn get_parameter(&self, name: &str, item_index: usize) -> Option<Value> {
        self.items.get(item_index).and_then(|item| item.get(name)).cloned()
    }

    async fn get_credentials(&self, name: &str) -> Result<Credentials> {
        self.credentials
            .clone()
            .ok_or_else(|| GlueError::Config(format!("No credentials named '{name}' configured")))
    }

    fn continue_on_failure(&self) -> bool {
        self.continue_on_failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_strips_host_and_query() {
        assert_eq!(path_of("https://glue.example.com/cms-pages?include=x"), "/cms-pages");
        assert_eq!(path_of("http://localhost:8080"), "/");
        assert_eq!(path_of("/abstract-products/001"), "/abstract-products/001");
    }

    #[tokio::test]
    async fn last_reply_is_sticky() {
        let transport = MockTransport::new();
        transport.on(HttpMethod::Get, "/x", Err(TransportError::status(500, "first")));
        transport.on(HttpMethod::Get, "/x", Ok(json!({ "n": 2 })));

        let first = transport.perform(RequestDescriptor::get("https://h/x")).await;
        let second = transport.perform(RequestDescriptor::get("https://h/x")).await;
        let third = transport.perform(RequestDescriptor::get("https://h/x")).await;

        assert!(first.is_err());
        assert_eq!(second.unwrap(), json!({ "n": 2 }));
        assert_eq!(third.unwrap(), json!({ "n": 2 }));
        assert_eq!(transport.count(HttpMethod::Get, "/x"), 3);
    }
}
