//! Document models

mod de;
pub mod health;
pub mod station;
