//! Operator HTTP console

pub mod errors;
pub mod handlers;
pub mod render;
pub mod serve;
pub mod state;
pub mod views;
