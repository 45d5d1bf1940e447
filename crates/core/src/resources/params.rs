//! Typed access to per-item node parameters

use glue_domain::{ErrorPayloadPolicy, GlueError, Result};
use serde_json::Value;

use super::transform::{parse_field_list, OutputOptions};
use crate::ports::NodeHost;

/// Parameter names understood by the node
pub mod names {
    pub const RESOURCE: &str = "resource";
    pub const OPERATION: &str = "operation";
    pub const CMS_PAGE_ID: &str = "cmsPageId";
    pub const PRODUCT_SKU: &str = "productSku";
    pub const REVIEW_ID: &str = "reviewId";
    pub const INCLUDE: &str = "include";
    pub const PAGE_SIZE: &str = "pageSize";
    pub const PAGE_NUMBER: &str = "pageNumber";
    pub const FIELDS_TO_EXTRACT: &str = "fieldsToExtract";
    pub const RAW_RESPONSE: &str = "rawResponse";
    pub const FILTERS: &str = "filters";
    pub const SORT: &str = "sort";
    pub const RATING: &str = "rating";
    pub const NICKNAME: &str = "nickname";
    pub const SUMMARY: &str = "summary";
    pub const DESCRIPTION: &str = "description";
}

/// Parameters of one input item
#[derive(Clone, Copy)]
pub struct ItemParams<'a> {
    host: &'a dyn NodeHost,
    item_index: usize,
}

impl<'a> ItemParams<'a> {
    pub fn new(host: &'a dyn NodeHost, item_index: usize) -> Self {
        Self { host, item_index }
    }

    pub fn item_index(&self) -> usize {
        self.item_index
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.host.get_parameter(name, self.item_index).filter(|v| !v.is_null())
    }

    /// Trimmed, non-empty string; numbers are accepted as well
    pub fn string(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// # Errors
    ///
    /// `GlueError::InvalidParameter` when the parameter is absent or blank.
    pub fn required_string(&self, name: &str) -> Result<String> {
        self.string(name)
            .ok_or_else(|| GlueError::InvalidParameter(format!("Parameter '{name}' is required")))
    }

    /// Non-negative integer given as a number or numeric string
    ///
    /// # Errors
    ///
    /// `GlueError::InvalidParameter` for any other value.
    pub fn u32(&self, name: &str) -> Result<Option<u32>> {
        let Some(value) = self.value(name) else {
            return Ok(None);
        };

        let parsed = match &value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };

        parsed.map(Some).ok_or_else(|| {
            GlueError::InvalidParameter(format!(
                "Parameter '{name}' must be a non-negative integer, got {value}"
            ))
        })
    }

    /// Booleans, or the strings `"true"` / `"false"`; absent means `false`
    pub fn flag(&self, name: &str) -> bool {
        match self.value(name) {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// `filters` as key/value pairs, from an object or a list of
    /// `{key, value}` entries; blank keys and values are skipped
    pub fn filters(&self) -> Vec<(String, String)> {
        let pairs: Vec<(String, String)> = match self.value(names::FILTERS) {
            Some(Value::Object(map)) => {
                map.into_iter().filter_map(|(k, v)| scalar(&v).map(|v| (k, v))).collect()
            }
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| {
                    let key = entry.get("key").and_then(Value::as_str)?;
                    let value = entry.get("value").and_then(scalar)?;
                    Some((key.to_string(), value))
                })
                .collect(),
            _ => Vec::new(),
        };

        pairs
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v))
            .filter(|(k, v)| !k.is_empty() && !v.trim().is_empty())
            .collect()
    }

    /// Raw flag, field list and error payload policy for this item
    pub fn output_options(&self, policy: ErrorPayloadPolicy) -> OutputOptions {
        OutputOptions {
            raw_response: self.flag(names::RAW_RESPONSE),
            fields: self.string(names::FIELDS_TO_EXTRACT).as_deref().and_then(parse_field_list),
            error_payload_policy: policy,
        }
    }
}

impl std::fmt::Debug for ItemParams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemParams").field("item_index", &self.item_index).finish_non_exhaustive()
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use glue_domain::Credentials;
    use serde_json::json;

    use super::*;
    use crate::testing::StaticHost;

    fn host(parameters: Value) -> StaticHost {
        StaticHost::new(Credentials::password("https://glue.example.com", "alice", "pw"))
            .with_item(parameters)
    }

    #[test]
    fn strings_are_trimmed_and_blank_is_absent() {
        let host = host(json!({ "productSku": "  001 ", "include": "  ", "cmsPageId": 42 }));
        let params = ItemParams::new(&host, 0);

        assert_eq!(params.string("productSku").as_deref(), Some("001"));
        assert_eq!(params.string("include"), None);
        assert_eq!(params.string("cmsPageId").as_deref(), Some("42"));
        assert!(matches!(
            params.required_string("reviewId"),
            Err(GlueError::InvalidParameter(message)) if message.contains("reviewId")
        ));
    }

    #[test]
    fn integers_accept_numbers_and_numeric_strings() {
        let host = host(json!({ "pageSize": 10, "pageNumber": "2", "rating": -1, "sort": "" }));
        let params = ItemParams::new(&host, 0);

        assert_eq!(params.u32("pageSize").unwrap(), Some(10));
        assert_eq!(params.u32("pageNumber").unwrap(), Some(2));
        assert_eq!(params.u32("sort").unwrap(), None);
        assert_eq!(params.u32("missing").unwrap(), None);
        assert!(params.u32("rating").is_err());
    }

    #[test]
    fn filters_from_object_or_entry_list() {
        let object_host = host(json!({ "filters": { "name": "Imprint", "empty": "", "rank": 3 } }));
        let mut filters = ItemParams::new(&object_host, 0).filters();
        filters.sort();
        assert_eq!(
            filters,
            vec![("name".to_string(), "Imprint".to_string()), ("rank".to_string(), "3".to_string())]
        );

        let list_host =
            host(json!({ "filters": [{ "key": "name", "value": "Imprint" }, { "key": "" }] }));
        assert_eq!(
            ItemParams::new(&list_host, 0).filters(),
            vec![("name".to_string(), "Imprint".to_string())]
        );
    }

    #[test]
    fn output_options_from_parameters() {
        let host = host(json!({ "rawResponse": "true", "fieldsToExtract": "name,url" }));
        let options = ItemParams::new(&host, 0).output_options(ErrorPayloadPolicy::Raise);

        assert!(options.raw_response);
        assert_eq!(options.fields, Some(vec!["name".to_string(), "url".to_string()]));
        assert_eq!(options.error_payload_policy, ErrorPayloadPolicy::Raise);
    }
}
