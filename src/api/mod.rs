pub mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{normalize_pool_response, ApiEnvelope, PoolPayload};
