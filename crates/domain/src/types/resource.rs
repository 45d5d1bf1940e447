//! Resources and operations exposed by the node

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GlueError;

/// Output record: a flat JSON object
pub type Record = serde_json::Value;

/// Key holding the untransformed source object
pub const RAW_KEY: &str = "_raw";
/// Key holding the JSON:API `links` member
pub const LINKS_KEY: &str = "links";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    CmsPage,
    AbstractProduct,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::CmsPage, Resource::AbstractProduct];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CmsPage => "cmsPage",
            Self::AbstractProduct => "abstractProduct",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CmsPage => "CMS Page",
            Self::AbstractProduct => "Abstract Product",
        }
    }

    /// Operations this resource supports
    pub fn operations(self) -> &'static [Operation] {
        match self {
            Self::CmsPage => &[Operation::GetMany, Operation::GetById],
            Self::AbstractProduct => &[
                Operation::GetById,
                Operation::GetPrices,
                Operation::GetAvailabilities,
                Operation::GetRelatedProducts,
                Operation::GetImages,
                Operation::GetTaxSets,
                Operation::GetReviews,
                Operation::GetReview,
                Operation::CreateReview,
            ],
        }
    }

    pub fn supports(self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = GlueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cmsPage" => Ok(Self::CmsPage),
            "abstractProduct" => Ok(Self::AbstractProduct),
            other => Err(GlueError::InvalidParameter(format!("unknown resource '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    GetMany,
    GetById,
    GetPrices,
    GetAvailabilities,
    GetRelatedProducts,
    GetImages,
    GetTaxSets,
    GetReviews,
    GetReview,
    CreateReview,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetMany => "getMany",
            Self::GetById => "getById",
            Self::GetPrices => "getPrices",
            Self::GetAvailabilities => "getAvailabilities",
            Self::GetRelatedProducts => "getRelatedProducts",
            Self::GetImages => "getImages",
            Self::GetTaxSets => "getTaxSets",
            Self::GetReviews => "getReviews",
            Self::GetReview => "getReview",
            Self::CreateReview => "createReview",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = GlueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "getMany" | "getAll" => Ok(Self::GetMany),
            "getById" | "get" => Ok(Self::GetById),
            "getPrices" => Ok(Self::GetPrices),
            "getAvailabilities" => Ok(Self::GetAvailabilities),
            "getRelatedProducts" => Ok(Self::GetRelatedProducts),
            "getImages" => Ok(Self::GetImages),
            "getTaxSets" => Ok(Self::GetTaxSets),
            "getReviews" => Ok(Self::GetReviews),
            "getReview" => Ok(Self::GetReview),
            "createReview" => Ok(Self::CreateReview),
            other => Err(GlueError::InvalidParameter(format!("unknown operation '{other}'"))),
        }
    }
}
