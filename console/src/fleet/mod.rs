//! Fleet state read from server heartbeat files

pub mod reader;
pub mod snapshot;
