//! Fleet document schemas
//!
//! JSON documents exchanged through shared storage between the console and
//! the station supervisors.

pub mod models;

pub use models::health::{Membership, ServerHealthRecord};
pub use models::station::{
    ActionRef, OrientationMode, ProfileActions, StationConfig, StationSettings,
    DEFAULT_ACTION_SET, DEFAULT_SUBFOLDER_ACTION_SET, TEMPERATURE_MAX, TEMPERATURE_MIN, UNASSIGNED,
};
