//! JSON:API payload normalization
//!
//! Every resource object becomes `{id, type, ...attributes, links, _raw}`.
//! Some resource types add derived fields on top (default price, image
//! URLs and similar) so common values do not need digging out of nested
//! attribute arrays.

use glue_domain::{ErrorPayloadPolicy, GlueError, Record, Result, LINKS_KEY, RAW_KEY};
use serde_json::{Map, Value};

use crate::request::classify::error_details;

/// Maps one JSON:API resource object to an output record
pub type Transform = fn(&Value) -> Record;

/// How a response is turned into output records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Return the response untouched
    pub raw_response: bool,
    /// Reduce each record to these keys
    pub fields: Option<Vec<String>>,
    pub error_payload_policy: ErrorPayloadPolicy,
}

/// Turn a response body into output records.
///
/// # Errors
///
/// Returns `GlueError::Api` only under [`ErrorPayloadPolicy::Raise`] when
/// the body has no `data` and a non-empty `errors` array.
pub fn shape_response(
    response: Value,
    transform: Transform,
    options: &OutputOptions,
) -> Result<Vec<Record>> {
    if options.raw_response {
        return Ok(vec![response]);
    }

    let records = match response.get("data") {
        Some(Value::Array(items)) => items.iter().map(transform).collect(),
        Some(item @ Value::Object(_)) => vec![transform(item)],
        _ => return missing_data(response, options.error_payload_policy),
    };

    Ok(match &options.fields {
        Some(fields) => records.iter().map(|record| extract_fields(record, fields)).collect(),
        None => records,
    })
}

fn missing_data(response: Value, policy: ErrorPayloadPolicy) -> Result<Vec<Record>> {
    if policy == ErrorPayloadPolicy::Raise {
        let details = error_details(&response);
        let has_errors =
            response.get("errors").and_then(Value::as_array).is_some_and(|e| !e.is_empty());
        if has_errors {
            let message = if details.is_empty() {
                "response contained errors".to_string()
            } else {
                details.join("; ")
            };
            return Err(GlueError::Api(message));
        }
    }
    Ok(vec![response])
}

/// Parse a comma separated field list; `None` when it names no field
pub fn parse_field_list(csv: &str) -> Option<Vec<String>> {
    let fields: Vec<String> = csv
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    (!fields.is_empty()).then_some(fields)
}

/// Keep only the requested keys that exist on `record`
pub fn extract_fields(record: &Record, fields: &[String]) -> Record {
    let Some(source) = record.as_object() else {
        return record.clone();
    };

    let reduced: Map<String, Value> = fields
        .iter()
        .filter_map(|field| source.get(field).map(|value| (field.clone(), value.clone())))
        .collect();
    Value::Object(reduced)
}

/// `{id, type, ...attributes, links, _raw}`
pub fn flatten(resource: &Value) -> Record {
    let mut record = Map::new();

    if let Some(attributes) = resource.get("attributes").and_then(Value::as_object) {
        record.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    record.insert("id".to_string(), resource.get("id").cloned().unwrap_or(Value::Null));
    record.insert("type".to_string(), resource.get("type").cloned().unwrap_or(Value::Null));
    if let Some(links) = resource.get("links") {
        record.insert(LINKS_KEY.to_string(), links.clone());
    }
    record.insert(RAW_KEY.to_string(), resource.clone());

    Value::Object(record)
}

pub fn cms_page(resource: &Value) -> Record {
    flatten(resource)
}

/// Abstract product; `sku` falls back to the resource id
pub fn abstract_product(resource: &Value) -> Record {
    let mut record = flatten(resource);
    if let Some(map) = record.as_object_mut() {
        if map.get("sku").map_or(true, Value::is_null) {
            let id = map.get("id").cloned().unwrap_or(Value::Null);
            map.insert("sku".to_string(), id);
        }
    }
    record
}

/// Prices; adds `defaultPrice` and `currency` from the DEFAULT price type
pub fn abstract_product_price(resource: &Value) -> Record {
    let mut record = flatten(resource);
    let prices = resource.pointer("/attributes/prices").and_then(Value::as_array);
    let default_price = prices.and_then(|prices| {
        prices
            .iter()
            .find(|p| p.get("priceTypeName").and_then(Value::as_str) == Some("DEFAULT"))
            .or_else(|| prices.first())
    });

    if let (Some(map), Some(price)) = (record.as_object_mut(), default_price) {
        let amount = price
            .get("grossAmount")
            .filter(|v| !v.is_null())
            .or_else(|| price.get("netAmount"))
            .cloned()
            .unwrap_or(Value::Null);
        let currency = price.pointer("/currency/code").cloned().unwrap_or(Value::Null);
        map.insert("defaultPrice".to_string(), amount);
        map.insert("currency".to_string(), currency);
    }
    record
}

/// Availability; adds `isAvailable`
pub fn abstract_product_availability(resource: &Value) -> Record {
    let mut record = flatten(resource);
    let attributes = resource.get("attributes");
    let flag = attributes.and_then(|a| a.get("availability")).and_then(Value::as_bool);
    let quantity = attributes.and_then(|a| a.get("quantity")).and_then(|q| match q {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });
    let never_out_of_stock = attributes
        .and_then(|a| a.get("isNeverOutOfStock"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let available = flag.unwrap_or_else(|| never_out_of_stock || quantity.is_some_and(|q| q > 0.0));
    if let Some(map) = record.as_object_mut() {
        map.insert("isAvailable".to_string(), Value::Bool(available));
    }
    record
}

/// Image sets; adds `imageUrls` (large variants) and `imageCount`
pub fn abstract_product_image_set(resource: &Value) -> Record {
    let mut record = flatten(resource);
    let urls: Vec<Value> = resource
        .pointer("/attributes/imageSets")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|set| set.get("images").and_then(Value::as_array))
        .flatten()
        .filter_map(|image| {
            image
                .get("externalUrlLarge")
                .or_else(|| image.get("externalUrlSmall"))
                .and_then(Value::as_str)
        })
        .map(|url| Value::String(url.to_string()))
        .collect();

    if let Some(map) = record.as_object_mut() {
        map.insert("imageCount".to_string(), Value::from(urls.len()));
        map.insert("imageUrls".to_string(), Value::Array(urls));
    }
    record
}

/// Tax sets; adds `taxRateSummary` such as `"Standard Tax Rate: 19% (DE)"`
pub fn product_tax_set(resource: &Value) -> Record {
    let mut record = flatten(resource);
    let summary: Vec<String> = resource
        .pointer("/attributes/taxRates")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|rate| {
            let name = rate.get("name").and_then(Value::as_str).unwrap_or("rate");
            let value = match rate.get("rate") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => "?".to_string(),
            };
            match rate.get("country").and_then(Value::as_str) {
                Some(country) => format!("{name}: {value}% ({country})"),
                None => format!("{name}: {value}%"),
            }
        })
        .collect();

    if let Some(map) = record.as_object_mut() {
        map.insert("taxRateSummary".to_string(), Value::String(summary.join(", ")));
    }
    record
}

pub fn product_review(resource: &Value) -> Record {
    flatten(resource)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn cms_page_resource() -> Value {
        json!({
            "type": "cms-pages",
            "id": "1",
            "attributes": { "name": "Page 1", "url": "/page-1", "isSearchable": true },
            "links": { "self": "https://glue.example.com/cms-pages/1" }
        })
    }

    #[test]
    fn flatten_merges_attributes_and_keeps_raw() {
        let record = flatten(&cms_page_resource());

        assert_eq!(record["id"], "1");
        assert_eq!(record["type"], "cms-pages");
        assert_eq!(record["name"], "Page 1");
        assert_eq!(record["links"]["self"], "https://glue.example.com/cms-pages/1");
        assert_eq!(record["_raw"], cms_page_resource());
    }

    #[test]
    fn field_extraction_keeps_only_requested_existing_keys() {
        let record = flatten(&cms_page_resource());
        let fields = parse_field_list("name, url,missing,").unwrap();

        assert_eq!(extract_fields(&record, &fields), json!({ "name": "Page 1", "url": "/page-1" }));
        assert_eq!(parse_field_list(" , "), None);
    }

    #[test]
    fn raw_response_is_returned_verbatim() {
        let response = json!({ "data": [cms_page_resource()], "links": {} });
        let options = OutputOptions {
            raw_response: true,
            fields: Some(vec!["name".into()]),
            ..OutputOptions::default()
        };

        assert_eq!(shape_response(response.clone(), cms_page, &options).unwrap(), vec![response]);
    }

    #[test]
    fn list_and_single_payloads() {
        let options = OutputOptions::default();

        let list = json!({ "data": [cms_page_resource(), cms_page_resource()] });
        assert_eq!(shape_response(list, cms_page, &options).unwrap().len(), 2);

        let single = json!({ "data": cms_page_resource() });
        let records = shape_response(single, cms_page, &options).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Page 1");
    }

    #[test]
    fn missing_data_passes_through_by_default() {
        let response = json!({ "errors": [] });

        let records = shape_response(response.clone(), cms_page, &OutputOptions::default()).unwrap();

        assert_eq!(records, vec![response]);
    }

    #[test]
    fn missing_data_with_errors_can_raise() {
        let options =
            OutputOptions { error_payload_policy: ErrorPayloadPolicy::Raise, ..OutputOptions::default() };
        let response = json!({
            "errors": [{ "status": 404, "code": "301", "detail": "Abstract product is not found." }]
        });

        let err = shape_response(response, abstract_product, &options).unwrap_err();
        assert_eq!(err, GlueError::Api("Abstract product is not found.".into()));

        let empty = json!({ "errors": [] });
        assert_eq!(shape_response(empty.clone(), abstract_product, &options).unwrap(), vec![empty]);
    }

    #[test]
    fn product_sku_falls_back_to_id() {
        let record = abstract_product(&json!({
            "type": "abstract-products", "id": "001", "attributes": { "name": "Canon IXUS 160" }
        }));
        assert_eq!(record["sku"], "001");

        let record = abstract_product(&json!({
            "type": "abstract-products", "id": "001", "attributes": { "sku": "SKU-1" }
        }));
        assert_eq!(record["sku"], "SKU-1");
    }

    #[test]
    fn price_uses_default_price_type() {
        let record = abstract_product_price(&json!({
            "type": "abstract-product-prices",
            "id": "001",
            "attributes": {
                "price": 9999,
                "prices": [
                    { "priceTypeName": "ORIGINAL", "grossAmount": 12000, "currency": { "code": "EUR" } },
                    { "priceTypeName": "DEFAULT", "grossAmount": 9999, "netAmount": 8403,
                      "currency": { "code": "EUR", "symbol": "€" } }
                ]
            }
        }));

        assert_eq!(record["defaultPrice"], 9999);
        assert_eq!(record["currency"], "EUR");
    }

    #[test]
    fn availability_flag() {
        let available = abstract_product_availability(&json!({
            "type": "abstract-product-availabilities", "id": "001",
            "attributes": { "availability": true, "quantity": "10.0000000000" }
        }));
        assert_eq!(available["isAvailable"], true);

        let by_quantity = abstract_product_availability(&json!({
            "type": "abstract-product-availabilities", "id": "002",
            "attributes": { "quantity": "0.0000000000" }
        }));
        assert_eq!(by_quantity["isAvailable"], false);
    }

    #[test]
    fn image_sets_collect_urls() {
        let record = abstract_product_image_set(&json!({
            "type": "abstract-product-image-sets", "id": "001",
            "attributes": { "imageSets": [
                { "name": "default", "images": [
                    { "externalUrlLarge": "https://img/large-1.jpg", "externalUrlSmall": "https://img/small-1.jpg" },
                    { "externalUrlSmall": "https://img/small-2.jpg" }
                ] }
            ] }
        }));

        assert_eq!(record["imageCount"], 2);
        assert_eq!(record["imageUrls"], json!(["https://img/large-1.jpg", "https://img/small-2.jpg"]));
    }

    #[test]
    fn tax_set_summary() {
        let record = product_tax_set(&json!({
            "type": "product-tax-sets", "id": "abc",
            "attributes": { "name": "Standard Taxes", "taxRates": [
                { "name": "Standard Tax Rate", "rate": "19.00", "country": "DE" },
                { "name": "Reduced", "rate": 7 }
            ] }
        }));

        assert_eq!(record["taxRateSummary"], "Standard Tax Rate: 19.00% (DE), Reduced: 7%");
    }
}
