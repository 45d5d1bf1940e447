//! Node entry point: one dispatch per input item

use std::sync::Arc;

use glue_core::resources::names;
use glue_core::{ItemParams, NodeHost};
use glue_domain::constants::{CREDENTIALS_NAME, ERROR_RECORD_KEY};
use glue_domain::{Record, Result};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::context::NodeContext;
use crate::description;
use crate::error::NodeError;

/// One output record paired with the input item it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutput {
    pub json: Record,
    pub item_index: usize,
}

#[derive(Debug, Clone)]
pub struct GlueNode {
    context: Arc<NodeContext>,
}

impl GlueNode {
    pub fn new(context: Arc<NodeContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<NodeContext> {
        &self.context
    }

    /// Run every input item of `host` in order.
    ///
    /// With continue-on-failure a failing item contributes one
    /// `{"error": message}` record and processing goes on; without it the
    /// first failure aborts the batch and nothing is returned.
    ///
    /// # Errors
    /// [`NodeError`] naming the index of the first failing item.
    #[instrument(skip_all, fields(items = host.item_count()))]
    pub async fn execute(&self, host: &dyn NodeHost) -> std::result::Result<Vec<NodeOutput>, NodeError> {
        let continue_on_failure = host.continue_on_failure();
        let mut output = Vec::new();

        for item_index in 0..host.item_count() {
            match self.run_item(host, item_index).await {
                Ok(records) => output.extend(
                    records.into_iter().map(|json| NodeOutput { json, item_index }),
                ),
                Err(err) if continue_on_failure => {
                    warn!(item_index, error = %err, "item failed, continuing");
                    output.push(NodeOutput {
                        json: json!({ ERROR_RECORD_KEY: err.to_string() }),
                        item_index,
                    });
                }
                Err(err) => {
                    warn!(item_index, error = %err, "item failed, aborting batch");
                    return Err(NodeError::new(item_index, err));
                }
            }
        }

        info!(records = output.len(), "execution finished");
        Ok(output)
    }

    async fn run_item(&self, host: &dyn NodeHost, item_index: usize) -> Result<Vec<Record>> {
        let params = ItemParams::new(host, item_index);
        let (resource, operation) = description::resolve(
            &params.required_string(names::RESOURCE)?,
            &params.required_string(names::OPERATION)?,
        )?;
        let credentials = host.get_credentials(CREDENTIALS_NAME).await?;

        self.context.factory().dispatch(resource, operation, &credentials, &params).await
    }
}

#[cfg(test)]
mod tests {
    use glue_core::testing::{token_response, MockTransport, StaticHost};
    use glue_domain::{ClientConfig, Credentials, GlueError, HttpMethod, TransportError};

    use super::*;

    fn node() -> (Arc<MockTransport>, GlueNode) {
        let transport = Arc::new(MockTransport::new());
        transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));
        let context = NodeContext::new(transport.clone(), ClientConfig::default().without_backoff());
        (transport, GlueNode::new(Arc::new(context)))
    }

    fn credentials() -> Credentials {
        Credentials::password("https://glue.example.com", "alice", "pw")
    }

    fn page_item(id: &str) -> serde_json::Value {
        json!({ "resource": "cmsPage", "operation": "getById", "cmsPageId": id })
    }

    fn mount_pages(transport: &MockTransport) {
        transport.on(HttpMethod::Get, "/cms-pages/1", Err(TransportError::status(404, "Not Found")));
        transport.on(
            HttpMethod::Get,
            "/cms-pages/2",
            Ok(json!({ "data": { "type": "cms-pages", "id": "2", "attributes": { "name": "Terms" } } })),
        );
    }

    #[tokio::test]
    async fn continue_on_failure_embeds_error_record_in_order() {
        let (transport, node) = node();
        mount_pages(&transport);
        let host = StaticHost::new(credentials())
            .with_item(page_item("1"))
            .with_item(page_item("2"))
            .with_continue_on_failure(true);

        let output = node.execute(&host).await.unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].item_index, 0);
        assert!(output[0].json["error"].as_str().unwrap().contains("Endpoint not found"));
        assert_eq!(output[1].item_index, 1);
        assert_eq!(output[1].json["name"], "Terms");
    }

    #[tokio::test]
    async fn failure_aborts_batch_with_item_index() {
        let (transport, node) = node();
        mount_pages(&transport);
        let host = StaticHost::new(credentials()).with_item(page_item("1")).with_item(page_item("2"));

        let err = node.execute(&host).await.unwrap_err();

        assert_eq!(err.item_index, 0);
        assert!(matches!(err.source, GlueError::NotFound(_)));
        assert_eq!(transport.count(HttpMethod::Get, "/cms-pages/2"), 0);
    }

    #[tokio::test]
    async fn list_records_share_the_item_index() {
        let (transport, node) = node();
        transport.on(
            HttpMethod::Get,
            "/cms-pages",
            Ok(json!({ "data": [
                { "type": "cms-pages", "id": "1", "attributes": {} },
                { "type": "cms-pages", "id": "2", "attributes": {} }
            ] })),
        );
        let host = StaticHost::new(credentials())
            .with_item(json!({ "resource": "cmsPage", "operation": "getMany" }));

        let output = node.execute(&host).await.unwrap();

        assert_eq!(output.iter().map(|o| o.item_index).collect::<Vec<_>>(), vec![0, 0]);
        assert_eq!(output[1].json["id"], "2");
    }

    #[tokio::test]
    async fn missing_credentials_and_bad_operation_fail_per_item() {
        let (transport, node) = node();
        let host = StaticHost::without_credentials()
            .with_item(page_item("1"))
            .with_item(json!({ "resource": "cmsPage", "operation": "getPrices" }))
            .with_continue_on_failure(true);

        let output = node.execute(&host).await.unwrap();

        assert!(output[0].json["error"].as_str().unwrap().contains("No credentials"));
        assert!(output[1].json["error"].as_str().unwrap().contains("not supported"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn empty_input_produces_no_output() {
        let (transport, node) = node();

        let output = node.execute(&StaticHost::new(credentials())).await.unwrap();

        assert!(output.is_empty());
        assert_eq!(transport.request_count(), 0);
    }
}
