//! Photobooth Fleet Console Library
//!
//! Core modules for the fleet operator console.

pub mod app;
pub mod assets;
pub mod authn;
pub mod blob;
pub mod cache;
pub mod errors;
pub mod filesys;
pub mod fleet;
pub mod http;
pub mod logs;
pub mod reconcile;
pub mod server;
pub mod stations;
pub mod storage;
pub mod utils;
