//! CMS pages: `/cms-pages` and `/cms-pages/{id}`

use glue_domain::constants::CMS_PAGES_ENDPOINT;
use glue_domain::{Credentials, Record, Result};
use tracing::instrument;

use super::params::{names, ItemParams};
use super::{segment, transform, ResourceClient};

#[derive(Debug, Clone)]
pub struct CmsPageService {
    client: ResourceClient,
}

impl CmsPageService {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    /// List pages with include, pagination, filters and sort
    #[instrument(skip_all, fields(item = params.item_index()))]
    pub async fn get_many(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        let mut builder = self
            .client
            .builder(credentials)
            .with_endpoint(CMS_PAGES_ENDPOINT)
            .with_include(params.string(names::INCLUDE).as_deref())
            .with_pagination(params.u32(names::PAGE_SIZE)?, params.u32(names::PAGE_NUMBER)?);
        for (key, value) in params.filters() {
            builder = builder.with_filter(&key, value);
        }
        let builder = builder.with_sort(params.string(names::SORT).as_deref());

        let options = self.client.output_options(params);
        self.client.get(credentials, &builder, transform::cms_page, &options).await
    }

    #[instrument(skip_all, fields(item = params.item_index()))]
    pub async fn get_by_id(
        &self,
        credentials: &Credentials,
        params: &ItemParams<'_>,
    ) -> Result<Vec<Record>> {
        let id = params.required_string(names::CMS_PAGE_ID)?;
        let builder = self
            .client
            .builder(credentials)
            .with_endpoint(format!("{CMS_PAGES_ENDPOINT}/{}", segment(&id)))
            .with_include(params.string(names::INCLUDE).as_deref());

        let options = self.client.output_options(params);
        self.client.get(credentials, &builder, transform::cms_page, &options).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glue_domain::{ClientConfig, GlueError, HttpMethod};
    use serde_json::{json, Value};

    use super::*;
    use crate::auth::{AuthService, TokenCache};
    use crate::ports::HttpTransport;
    use crate::request::RequestExecutor;
    use crate::testing::{token_response, MockTransport, StaticHost};

    fn service() -> (Arc<MockTransport>, CmsPageService) {
        let transport = Arc::new(MockTransport::new());
        transport.on(HttpMethod::Post, "/access-tokens", Ok(token_response("a1", "r1", 3600)));
        let dyn_transport = Arc::clone(&transport) as Arc<dyn HttpTransport>;
        let auth = Arc::new(AuthService::new(
            Arc::clone(&dyn_transport),
            Arc::new(TokenCache::new()),
            ClientConfig::default().without_backoff(),
        ));
        let executor = Arc::new(RequestExecutor::new(auth, dyn_transport));
        (transport, CmsPageService::new(ResourceClient::new(executor)))
    }

    fn host(parameters: Value) -> StaticHost {
        StaticHost::new(Credentials::password("https://glue.example.com/", "alice", "pw"))
            .with_item(parameters)
    }

    fn credentials() -> Credentials {
        Credentials::password("https://glue.example.com/", "alice", "pw")
    }

    fn page(id: &str, name: &str) -> Value {
        json!({
            "type": "cms-pages",
            "id": id,
            "attributes": { "name": name, "url": format!("/{id}") },
            "links": { "self": format!("https://glue.example.com/cms-pages/{id}") }
        })
    }

    #[tokio::test]
    async fn get_many_builds_query_and_flattens() {
        let (transport, service) = service();
        transport.on(HttpMethod::Get, "/cms-pages", Ok(json!({ "data": [page("1", "Imprint"), page("2", "Terms")] })));
        let host = host(json!({
            "include": "cms-page-content",
            "pageSize": 10,
            "pageNumber": 2,
            "filters": { "name": "Imprint" },
            "sort": "-name"
        }));

        let records = service.get_many(&credentials(), &ItemParams::new(&host, 0)).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Imprint");
        assert_eq!(records[1]["_raw"], page("2", "Terms"));
        let request = transport.last_request("/cms-pages").unwrap();
        assert_eq!(
            request.url,
            "https://glue.example.com/cms-pages?include=cms-page-content&page[limit]=10\
             &page[offset]=10&filter[name]=Imprint&sort=-name"
        );
    }

    #[tokio::test]
    async fn get_by_id_with_field_extraction() {
        let (transport, service) = service();
        transport.on(HttpMethod::Get, "/cms-pages/1", Ok(json!({ "data": page("1", "Page 1") })));
        let host = host(json!({ "cmsPageId": "1", "fieldsToExtract": "name,url" }));

        let records = service.get_by_id(&credentials(), &ItemParams::new(&host, 0)).await.unwrap();

        assert_eq!(records, vec![json!({ "name": "Page 1", "url": "/1" })]);
    }

    #[tokio::test]
    async fn get_by_id_requires_page_id() {
        let (transport, service) = service();
        let host = host(json!({}));

        let err = service.get_by_id(&credentials(), &ItemParams::new(&host, 0)).await.unwrap_err();

        assert!(matches!(err, GlueError::InvalidParameter(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn error_payload_passes_through_for_list_and_single() {
        let (transport, service) = service();
        let body = json!({ "errors": [] });
        transport.on(HttpMethod::Get, "/cms-pages", Ok(body.clone()));
        transport.on(HttpMethod::Get, "/cms-pages/9", Ok(body.clone()));

        let list_host = host(json!({}));
        let records = service.get_many(&credentials(), &ItemParams::new(&list_host, 0)).await.unwrap();
        assert_eq!(records, vec![body.clone()]);

        let single_host = host(json!({ "cmsPageId": "9" }));
        let records =
            service.get_by_id(&credentials(), &ItemParams::new(&single_host, 0)).await.unwrap();
        assert_eq!(records, vec![body]);
    }
}
