//! Storage API HTTP client

pub mod client;
pub mod files;
