pub mod client;
pub mod error;
pub mod graphql;
pub mod pool;
pub mod v0;
pub mod v1;

pub use client::{Client, Endpoint, RetryConfig, DEFAULT_API_URL};
pub use error::ApiError;
