//! Access token management

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::authn::credentials::Credentials;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Refresh this long before the reported expiry
const EXPIRY_MARGIN_SECS: i64 = 300;

/// A bearer token for the storage API
#[derive(Debug, Clone)]
pub struct AccessToken {
    raw: Arc<SecretString>,

    /// `None` for tokens that never expire
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(raw: SecretString, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            raw: Arc::new(raw),
            expires_at,
        }
    }

    pub fn expose(&self) -> &str {
        self.raw.expose_secret()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| exp <= Utc::now())
    }

    /// Check if the token expires within the given number of seconds
    pub fn expires_within(&self, seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|exp| exp <= Utc::now() + Duration::seconds(seconds))
    }
}

/// Token manager trait for testability
#[async_trait]
pub trait TokenManagerExt: Send + Sync {
    /// Get a usable token, refreshing if it is about to expire
    async fn get_token(&self) -> Result<AccessToken, ConsoleError>;

    /// Force a refresh
    async fn refresh_token(&self) -> Result<AccessToken, ConsoleError>;
}

/// Token manager implementation
pub struct TokenManager {
    credentials: Credentials,
    http_client: Arc<HttpClient>,
    cached_token: RwLock<Option<AccessToken>>,

    /// Serializes token fetches
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, http_client: Arc<HttpClient>) -> Self {
        Self {
            credentials,
            http_client,
            cached_token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Cached token that is not about to expire
    async fn usable_cached(&self) -> Option<AccessToken> {
        let cached = self.cached_token.read().await;
        match cached.as_ref() {
            Some(token) if !token.expires_within(EXPIRY_MARGIN_SECS) => Some(token.clone()),
            Some(token) => {
                debug!("Access token expiring at {:?}", token.expires_at());
                None
            }
            None => None,
        }
    }

    async fn fetch_token(&self) -> Result<AccessToken, ConsoleError> {
        let token = match &self.credentials {
            Credentials::Static { access_token } => AccessToken::new(
                SecretString::from(access_token.expose_secret().to_string()),
                None,
            ),
            Credentials::RefreshToken {
                app_key,
                app_secret,
                refresh_token,
            } => {
                info!("Refreshing storage access token...");
                let response = self
                    .http_client
                    .refresh_access_token(
                        app_key,
                        app_secret.expose_secret(),
                        refresh_token.expose_secret(),
                    )
                    .await?;

                let expires_at = response
                    .expires_in
                    .map(|secs| Utc::now() + Duration::seconds(secs));
                info!("Access token refreshed, expires at: {:?}", expires_at);
                AccessToken::new(SecretString::from(response.access_token), expires_at)
            }
        };

        let mut cached = self.cached_token.write().await;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl TokenManagerExt for TokenManager {
    async fn get_token(&self) -> Result<AccessToken, ConsoleError> {
        if let Some(token) = self.usable_cached().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while this one waited
        if let Some(token) = self.usable_cached().await {
            return Ok(token);
        }
        self.fetch_token().await
    }

    async fn refresh_token(&self) -> Result<AccessToken, ConsoleError> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_token().await
    }
}
