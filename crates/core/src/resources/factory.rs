//! Routes a (resource, operation) pair to its service method

use std::sync::Arc;

use glue_domain::{Credentials, GlueError, Operation, Record, Resource, Result};
use tracing::{debug, instrument};

use super::params::ItemParams;
use super::{AbstractProductService, CmsPageService, ResourceClient};
use crate::request::RequestExecutor;

#[derive(Debug, Clone)]
pub struct ResourceFactory {
    cms_pages: CmsPageService,
    abstract_products: AbstractProductService,
}

impl ResourceFactory {
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        let client = ResourceClient::new(executor);
        Self {
            cms_pages: CmsPageService::new(client.clone()),
            abstract_products: AbstractProductService::new(client),
        }
    }

    pub fn cms_pages(&self) -> &CmsPageService {
        &self.cms_pages
    }

    pub fn abstract_products(&self) -> &AbstractProductService {
        &self.abstract_products
    }

    /// Run `operation` on `resource` for one item.
    ///
    /// # Errors
    ///
    /// `GlueError::InvalidParameter` when the resource does not support the
    /// operation; otherwise whatever the service method returns.
    #[instrument(skip(self, credentials, params), fields(item = params.item_index()))]
    pub async fn dispatch(
        &self,
        resource: Resource,
        operation: Operation,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        debug!("dispatching operation");
        let products = &self.abstract_products;

        match (resource, operation) {
            (Resource::CmsPage, Operation::GetMany) => self.cms_pages.get_many(credentials, params).await,
            (Resource::CmsPage, Operation::GetById) => self.cms_pages.get_by_id(credentials, params).await,
            (Resource::AbstractProduct, Operation::GetById) => products.get_by_id(credentials, params).await,
            (Resource::AbstractProduct, Operation::GetPrices) => {
                products.get_prices(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::GetAvailabilities) => {
                products.get_availabilities(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::GetRelatedProducts) => {
                products.get_related_products(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::GetImages) => {
                products.get_images(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::GetTaxSets) => {
                products.get_tax_sets(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::GetReviews) => {
                products.get_reviews(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::GetReview) => {
                products.get_review(credentials, params).await
            }
            (Resource::AbstractProduct, Operation::CreateReview) => {
                products.create_review(credentials, params).await
            }
            (resource, operation) => Err(GlueError::InvalidParameter(format!(
                "Operation '{operation}' is not supported for resource '{resource}'"
            ))),
        }
    }
}
