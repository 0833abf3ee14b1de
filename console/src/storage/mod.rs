//! Storage layout and console settings

pub mod layout;
pub mod settings;
