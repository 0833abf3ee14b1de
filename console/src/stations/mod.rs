//! Station registry, config repository and config edits

pub mod editor;
pub mod registry;
pub mod repository;
