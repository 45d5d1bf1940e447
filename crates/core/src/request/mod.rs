//! Request construction, execution and failure classification

pub mod builder;
pub mod classify;
pub mod executor;

pub use builder::RequestBuilder;
pub use executor::RequestExecutor;
