//! Storage account credentials

use secrecy::SecretString;
use tracing::warn;

use crate::errors::ConsoleError;

pub const ENV_APP_KEY: &str = "DROPBOX_APP_KEY";
pub const ENV_APP_SECRET: &str = "DROPBOX_APP_SECRET";
pub const ENV_REFRESH_TOKEN: &str = "DROPBOX_REFRESH_TOKEN";
pub const ENV_STATIC_TOKEN: &str = "DROPBOX_TOKEN";

/// Credentials for the storage API
#[derive(Debug)]
pub enum Credentials {
    /// OAuth app key/secret plus a long-lived refresh token
    RefreshToken {
        app_key: String,
        app_secret: SecretString,
        refresh_token: SecretString,
    },

    /// Legacy static access token
    Static { access_token: SecretString },
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConsoleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through `lookup`, preferring the refresh-token
    /// triple over the static token. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConsoleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let (Some(app_key), Some(app_secret), Some(refresh_token)) = (
            get(ENV_APP_KEY),
            get(ENV_APP_SECRET),
            get(ENV_REFRESH_TOKEN),
        ) {
            return Ok(Credentials::RefreshToken {
                app_key,
                app_secret: SecretString::from(app_secret),
                refresh_token: SecretString::from(refresh_token),
            });
        }

        if let Some(token) = get(ENV_STATIC_TOKEN) {
            warn!(
                "Using legacy {} (static). Prefer refresh-token auth.",
                ENV_STATIC_TOKEN
            );
            return Ok(Credentials::Static {
                access_token: SecretString::from(token),
            });
        }

        Err(ConsoleError::AuthError(format!(
            "Storage credentials missing. Set {}, {}, {}.",
            ENV_REFRESH_TOKEN, ENV_APP_KEY, ENV_APP_SECRET
        )))
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Credentials::Static { .. })
    }
}
