//! Domain types and models

pub mod credentials;
pub mod request;
pub mod resource;
pub mod token;

pub use credentials::Credentials;
pub use request::{network_codes, HttpMethod, RequestDescriptor, TransportError};
pub use resource::{Operation, Record, Resource, LINKS_KEY, RAW_KEY};
pub use token::{CachedToken, TokenGrant};
