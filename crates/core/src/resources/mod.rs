//! Resource services and the (resource, operation) dispatcher

pub mod abstract_product;
pub mod cms_page;
pub mod factory;
pub mod params;
pub mod transform;

use std::sync::Arc;

use glue_domain::{Credentials, Record, RequestDescriptor, Result};
use serde_json::Value;
use tracing::debug;

pub use abstract_product::AbstractProductService;
pub use cms_page::CmsPageService;
pub use factory::ResourceFactory;
pub use params::{names, ItemParams};
pub use transform::{OutputOptions, Transform};

use crate::request::{RequestBuilder, RequestExecutor};

/// Shared plumbing of the resource services: URL base, execution, shaping
#[derive(Debug, Clone)]
pub struct ResourceClient {
    executor: Arc<RequestExecutor>,
}

impl ResourceClient {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Builder rooted at the credentials' base URL
    pub fn builder(&self, credentials: &Credentials) -> RequestBuilder {
        RequestBuilder::new(credentials.normalized_base_url())
            .with_default_page_size(self.executor.config().default_page_size)
    }

    /// Output options for the item, with the configured error payload policy
    pub fn output_options(&self, params: &ItemParams<'_>) -> OutputOptions {
        params.output_options(self.executor.config().error_payload_policy)
    }

    pub async fn get(
        &self,
        credentials: &Credentials,
        builder: &RequestBuilder,
        transform: Transform,
        options: &OutputOptions,
    ) -> Result<Vec<Record>> {
        let url = builder.build();
        let response = self.executor.execute(credentials, RequestDescriptor::get(url)).await?;
        Self::shape(response, transform, options)
    }

    pub async fn post(
        &self,
        credentials: &Credentials,
        builder: &RequestBuilder,
        body: Value,
        transform: Transform,
        options: &OutputOptions,
    ) -> Result<Vec<Record>> {
        let url = builder.build();
        let response =
            self.executor.execute(credentials, RequestDescriptor::post(url, body)).await?;
        Self::shape(response, transform, options)
    }

    fn shape(response: Value, transform: Transform, options: &OutputOptions) -> Result<Vec<Record>> {
        let records = transform::shape_response(response, transform, options)?;
        debug!(records = records.len(), raw = options.raw_response, "shaped response");
        Ok(records)
    }
}

/// Percent-encode one path segment (ids and SKUs)
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
