//! Abstract products and their sub-resources under
//! `/abstract-products/{sku}`

use glue_domain::constants::{
    ABSTRACT_PRODUCTS_ENDPOINT, ABSTRACT_PRODUCT_AVAILABILITIES, ABSTRACT_PRODUCT_IMAGE_SETS,
    ABSTRACT_PRODUCT_PRICES, PRODUCT_REVIEWS, PRODUCT_REVIEWS_TYPE, PRODUCT_TAX_SETS,
    RELATED_PRODUCTS,
};
use glue_domain::{Credentials, GlueError, Record, Result};
use serde_json::{json, Map, Value};
use tracing::instrument;

use super::params::{names, ItemParams};
use super::transform::{self, Transform};
use super::{segment, ResourceClient};
use crate::request::RequestBuilder;

const MIN_RATING: u32 = 1;
const MAX_RATING: u32 = 5;

#[derive(Debug, Clone)]
pub struct AbstractProductService {
    client: ResourceClient,
}

impl AbstractProductService {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(item = params.item_index()))]
    pub async fn get_by_id(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        let builder = self
            .product_builder(credentials, params, None)?
            .with_include(params.string(names::INCLUDE).as_deref());
        self.fetch(credentials, params, &builder, transform::abstract_product).await
    }

    pub async fn get_prices(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        self.sub_resource(credentials, params, ABSTRACT_PRODUCT_PRICES, transform::abstract_product_price)
            .await
    }

    pub async fn get_availabilities(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        self.sub_resource(
            credentials,
            params,
            ABSTRACT_PRODUCT_AVAILABILITIES,
            transform::abstract_product_availability,
        )
        .await
    }

    pub async fn get_related_products(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        self.sub_resource(credentials, params, RELATED_PRODUCTS, transform::abstract_product).await
    }

    pub async fn get_images(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        self.sub_resource(
            credentials,
            params,
            ABSTRACT_PRODUCT_IMAGE_SETS,
            transform::abstract_product_image_set,
        )
        .await
    }

    pub async fn get_tax_sets(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        self.sub_resource(credentials, params, PRODUCT_TAX_SETS, transform::product_tax_set).await
    }

    /// Reviews of a product, paginated
    #[instrument(skip_all, fields(item = params.item_index()))]
    pub async fn get_reviews(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        let builder = self
            .product_builder(credentials, params, Some(PRODUCT_REVIEWS))?
            .with_include(params.string(names::INCLUDE).as_deref())
            .with_pagination(params.u32(names::PAGE_SIZE)?, params.u32(names::PAGE_NUMBER)?);
        self.fetch(credentials, params, &builder, transform::product_review).await
    }

    #[instrument(skip_all, fields(item = params.item_index()))]
    pub async fn get_review(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        let sku = params.required_string(names::PRODUCT_SKU)?;
        let review_id = params.required_string(names::REVIEW_ID)?;
        let builder = self
            .client
            .builder(credentials)
            .with_endpoint(format!(
                "{ABSTRACT_PRODUCTS_ENDPOINT}/{}/{PRODUCT_REVIEWS}/{}",
                segment(&sku),
                segment(&review_id)
            ))
            .with_include(params.string(names::INCLUDE).as_deref());
        self.fetch(credentials, params, &builder, transform::product_review).await
    }

    /// Post a review; the created resource is shaped like a read
    #[instrument(skip_all, fields(item = params.item_index()))]
    pub async fn create_review(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        let builder = self.product_builder(credentials, params, Some(PRODUCT_REVIEWS))?;
        let body = review_body(params)?;

        let options = self.client.output_options(params);
        self.client.post(credentials, &builder, body, transform::product_review, &options).await
    }

    async fn sub_resource(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
        sub_resource: &str,
        transform: Transform,
    ) -> Result<Vec<Record>> {
        let builder = self
            .product_builder(credentials, params, Some(sub_resource))?
            .with_include(params.string(names::INCLUDE).as_deref());
        self.fetch(credentials, params, &builder, transform).await
    }

    async fn fetch(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
        builder: &RequestBuilder,
        transform: Transform,
    ) -> Result<Vec<Record>> {
        let options = self.client.output_options(params);
        self.client.get(credentials, builder, transform, &options).await
    }

    fn product_builder(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
        sub_resource: Option<&str>,
    ) -> Result<RequestBuilder> {
        let sku = segment(&params.required_string(names::PRODUCT_SKU)?);
        let endpoint = match sub_resource {
            Some(sub) => format!("{ABSTRACT_PRODUCTS_ENDPOINT}/{sku}/{sub}"),
            None => format!("{ABSTRACT_PRODUCTS_ENDPOINT}/{sku}"),
        };
        Ok(self.client.builder(credentials).with_endpoint(endpoint))
    }
}

fn review_body(params: &ItemParams<'_>) -> Result<Value> {
    let rating = params
        .u32(names::RATING)?
        .ok_or_else(|| GlueError::InvalidParameter("Parameter 'rating' is required".into()))?;
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(GlueError::InvalidParameter(format!(
            "Parameter 'rating' must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }

    let mut attributes = Map::new();
    attributes.insert("rating".into(), json!(rating));
    attributes.insert("nickname".into(), json!(params.required_string(names::NICKNAME)?));
    attributes.insert("summary".into(), json!(params.required_string(names::SUMMARY)?));
    if let Some(description) = params.string(names::DESCRIPTION) {
        attributes.insert("description".into(), json!(description));
    }

    Ok(json!({ "data": { "type": PRODUCT_REVIEWS_TYPE, "attributes": attributes } }))
}
