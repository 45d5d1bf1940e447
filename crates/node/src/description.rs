//! Static node description: resources, operations and their parameters

use glue_core::resources::names;
use glue_domain::constants::CREDENTIALS_NAME;
use glue_domain::{GlueError, Operation, Resource, Result};
use serde::Serialize;

/// Parameters every operation accepts
const OUTPUT_PARAMETERS: [&str; 2] = [names::RAW_RESPONSE, names::FIELDS_TO_EXTRACT];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub credentials: &'static str,
    pub resources: Vec<ResourceDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    pub resource: Resource,
    pub display_name: &'static str,
    pub operations: Vec<OperationDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescription {
    pub operation: Operation,
    pub required: Vec<&'static str>,
    pub optional: Vec<&'static str>,
}

/// Describe everything the node can do
pub fn describe() -> NodeDescription {
    NodeDescription {
        name: "glueApi",
        display_name: "Glue API",
        credentials: CREDENTIALS_NAME,
        resources: Resource::ALL
            .iter()
            .map(|&resource| ResourceDescription {
                resource,
                display_name: resource.display_name(),
                operations: resource
                    .operations()
                    .iter()
                    .map(|&operation| describe_operation(resource, operation))
                    .collect(),
            })
            .collect(),
    }
}

fn describe_operation(resource: Resource, operation: Operation) -> OperationDescription {
    let (required, optional): (Vec<&'static str>, Vec<&'static str>) = match (resource, operation) {
        (Resource::CmsPage, Operation::GetMany) => (
            vec![],
            vec![names::INCLUDE, names::PAGE_SIZE, names::PAGE_NUMBER, names::FILTERS, names::SORT],
        ),
        (Resource::CmsPage, _) => (vec![names::CMS_PAGE_ID], vec![names::INCLUDE]),
        (Resource::AbstractProduct, Operation::GetById) => {
            (vec![names::PRODUCT_SKU], vec![names::INCLUDE])
        }
        (Resource::AbstractProduct, Operation::GetReviews) => {
            (vec![names::PRODUCT_SKU], vec![names::PAGE_SIZE, names::PAGE_NUMBER])
        }
        (Resource::AbstractProduct, Operation::GetReview) => {
            (vec![names::PRODUCT_SKU, names::REVIEW_ID], vec![])
        }
        (Resource::AbstractProduct, Operation::CreateReview) => (
            vec![names::PRODUCT_SKU, names::RATING, names::NICKNAME, names::SUMMARY],
            vec![names::DESCRIPTION],
        ),
        (Resource::AbstractProduct, _) => (vec![names::PRODUCT_SKU], vec![]),
    };

    let mut optional = optional;
    optional.extend(OUTPUT_PARAMETERS);
    OperationDescription { operation, required, optional }
}

/// Parse and check a (resource, operation) pair given as host parameters
///
/// # Errors
/// `GlueError::InvalidParameter` for unknown names or a pair the resource
/// does not support.
pub fn resolve(resource: &str, operation: &str) -> Result<(Resource, Operation)> {
    let resource: Resource = resource.parse()?;
    let operation: Operation = operation.parse()?;

    if !resource.supports(operation) {
        return Err(GlueError::InvalidParameter(format!(
            "Operation '{operation}' is not supported for resource '{resource}'"
        )));
    }
    Ok((resource, operation))
}
