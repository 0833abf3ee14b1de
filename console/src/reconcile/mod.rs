//! Station status and assignment rules

pub mod assignment;
pub mod policy;
pub mod status;
