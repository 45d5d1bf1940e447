//! JSON:API resource URL construction
//!
//! ```
//! use glue_core::request::RequestBuilder;
//!
//! let url = RequestBuilder::new("https://glue.example.com/")
//!     .with_endpoint("cms-pages")
//!     .with_include(Some("cms-page-content"))
//!     .with_pagination(Some(10), Some(2))
//!     .build();
//!
//! assert_eq!(
//!     url,
//!     "https://glue.example.com/cms-pages?include=cms-page-content&page[limit]=10&page[offset]=10"
//! );
//! ```

use glue_domain::constants::DEFAULT_PAGE_SIZE;

/// Builds `base + endpoint + ?query`, keeping parameters in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilder {
    base_url: String,
    endpoint: String,
    query: Vec<(String, String)>,
    default_page_size: u32,
}

impl RequestBuilder {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_string(),
            endpoint: String::new(),
            query: Vec::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size used for offsets when no explicit size is given
    #[must_use]
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, path: impl AsRef<str>) -> Self {
        let path = path.as_ref().trim();
        self.endpoint = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self
    }

    /// Add `key=value`; blank values are ignored and a repeated key
    /// replaces the earlier value in place
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return self;
        }

        let key = key.into();
        match self.query.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.query.push((key, value.to_string())),
        }
        self
    }

    #[must_use]
    pub fn with_optional_query_param(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_query_param(key, value),
            None => self,
        }
    }

    /// `include=<csv>` with blank entries removed
    #[must_use]
    pub fn with_include(self, include: Option<&str>) -> Self {
        let Some(include) = include else {
            return self;
        };
        let normalized = include
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.with_query_param("include", normalized)
    }

    /// `page[limit]` and, past the first page, `page[offset]`
    #[must_use]
    pub fn with_pagination(mut self, page_size: Option<u32>, page_number: Option<u32>) -> Self {
        if let Some(limit) = page_size.filter(|size| *size > 0) {
            self = self.with_query_param("page[limit]", limit.to_string());
        }

        if let Some(page) = page_number.filter(|page| *page > 1) {
            let size = page_size.filter(|size| *size > 0).unwrap_or(self.default_page_size);
            let offset = u64::from(page - 1) * u64::from(size);
            self = self.with_query_param("page[offset]", offset.to_string());
        }
        self
    }

    /// `filter[<key>]=<value>`
    #[must_use]
    pub fn with_filter(self, key: &str, value: impl AsRef<str>) -> Self {
        self.with_query_param(format!("filter[{}]", key.trim()), value)
    }

    /// `sort=<field>`; prefix the field with `-` for descending order
    #[must_use]
    pub fn with_sort(self, sort: Option<&str>) -> Self {
        self.with_optional_query_param("sort", sort)
    }

    /// Assemble the URL. Calling it repeatedly yields the same string.
    pub fn build(&self) -> String {
        let mut url = format!("{}{}", self.base_url, self.endpoint);
        if self.query.is_empty() {
            return url;
        }

        let query = self
            .query
            .iter()
            .map(|(key, value)| format!("{}={}", encode_key(key), encode_value(value)))
            .collect::<Vec<_>>()
            .join("&");
        url.push('?');
        url.push_str(&query);
        url
    }
}

// JSON:API bracket syntax stays readable: `page[limit]`, `filter[name]`.
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).replace("%5B", "[").replace("%5D", "]")
}

fn encode_value(value: &str) -> String {
    urlencoding::encode(value).replace("%2C", ",")
}
