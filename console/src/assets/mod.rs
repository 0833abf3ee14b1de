//! Template and action uploads

pub mod sentinel;
pub mod uploader;
