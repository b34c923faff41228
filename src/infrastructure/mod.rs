//! Infrastructure layer - remote API clients

pub mod api_clients;

pub use api_clients::{LlamaApiClient, YieldsApi};
