//! In-memory caches

pub mod ttl;
