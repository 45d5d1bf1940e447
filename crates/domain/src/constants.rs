//! Domain constants
//!
//! Centralized location for wire names and timing defaults.

// Token endpoints and JSON:API resource types
pub const ACCESS_TOKENS_ENDPOINT: &str = "/access-tokens";
pub const REFRESH_TOKENS_ENDPOINT: &str = "/refresh-tokens";
pub const ACCESS_TOKENS_TYPE: &str = "access-tokens";
pub const REFRESH_TOKENS_TYPE: &str = "refresh-tokens";
pub const PRODUCT_REVIEWS_TYPE: &str = "product-reviews";

// Resource endpoints
pub const CMS_PAGES_ENDPOINT: &str = "/cms-pages";
pub const ABSTRACT_PRODUCTS_ENDPOINT: &str = "/abstract-products";
pub const ABSTRACT_PRODUCT_PRICES: &str = "abstract-product-prices";
pub const ABSTRACT_PRODUCT_AVAILABILITIES: &str = "abstract-product-availabilities";
pub const RELATED_PRODUCTS: &str = "related-products";
pub const ABSTRACT_PRODUCT_IMAGE_SETS: &str = "abstract-product-image-sets";
pub const PRODUCT_TAX_SETS: &str = "product-tax-sets";
pub const PRODUCT_REVIEWS: &str = "product-reviews";

// Token lifecycle
/// Subtracted from the server-reported lifetime when computing `expires_at`
pub const TOKEN_SAFETY_MARGIN_MS: u64 = 60_000;
/// Tokens this close to expiry are refreshed proactively
pub const TOKEN_REFRESH_WINDOW_SECS: u64 = 300;
pub const MAX_AUTH_ATTEMPTS: u32 = 3;
pub const AUTH_BACKOFF_BASE_MS: u64 = 1_000;

// Requests
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_TRANSIENT_RETRIES: u32 = 2;
pub const RETRY_BACKOFF_BASE_MS: u64 = 1_000;
pub const JSON_CONTENT_TYPE: &str = "application/json";

// Host integration
/// Credential set name requested from the host
pub const CREDENTIALS_NAME: &str = "glueApi";
/// Key of the error message in embedded error records
pub const ERROR_RECORD_KEY: &str = "error";
