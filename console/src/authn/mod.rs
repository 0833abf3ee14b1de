//! Storage account authentication

pub mod credentials;
pub mod token_mngr;
