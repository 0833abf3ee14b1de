//! HTTP client implementation

use std::time::Duration;

use http::HeaderName;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::ConsoleError;

/// Header carrying the JSON argument of content-endpoint calls
pub const API_ARG_HEADER: HeaderName = HeaderName::from_static("dropbox-api-arg");

/// Storage API endpoints
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// RPC endpoints (listing, metadata)
    pub api_base_url: String,

    /// Content endpoints (upload, download)
    pub content_base_url: String,

    /// OAuth token endpoint
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.dropboxapi.com/2".to_string(),
            content_base_url: "https://content.dropboxapi.com/2".to_string(),
            token_url: "https://api.dropboxapi.com/oauth2/token".to_string(),
        }
    }
}

impl Endpoints {
    /// Check every endpoint is an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConsoleError> {
        for raw in [&self.api_base_url, &self.content_base_url, &self.token_url] {
            let url = Url::parse(raw)
                .map_err(|e| ConsoleError::ConfigError(format!("Invalid URL {}: {}", raw, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConsoleError::ConfigError(format!(
                    "Unsupported URL scheme: {}",
                    raw
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client for the storage API
pub struct HttpClient {
    client: Client,
    endpoints: Endpoints,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, ConsoleError> {
        endpoints.validate()?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoints: Endpoints {
                api_base_url: endpoints.api_base_url.trim_end_matches('/').to_string(),
                content_base_url: endpoints.content_base_url.trim_end_matches('/').to_string(),
                token_url: endpoints.token_url,
            },
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Call a JSON-in/JSON-out RPC endpoint
    pub async fn rpc<T: DeserializeOwned, B: Serialize>(
        &self,
        route: &str,
        token: &str,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let url = format!("{}{}", self.endpoints.api_base_url, route);
        debug!("POST {}", url);

        let request = self.client.post(&url).bearer_auth(token).json(body);
        let response = send(request, "RPC").await?;
        Ok(response.json().await?)
    }

    /// Download a blob from a content endpoint
    pub async fn download<A: Serialize>(
        &self,
        route: &str,
        token: &str,
        arg: &A,
    ) -> Result<Vec<u8>, ConsoleError> {
        let url = format!("{}{}", self.endpoints.content_base_url, route);
        debug!("POST {} (download)", url);

        let request = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(API_ARG_HEADER, header_arg(arg)?);
        let response = send(request, "Download").await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a blob to a content endpoint
    pub async fn upload<T: DeserializeOwned, A: Serialize>(
        &self,
        route: &str,
        token: &str,
        arg: &A,
        bytes: Vec<u8>,
    ) -> Result<T, ConsoleError> {
        let url = format!("{}{}", self.endpoints.content_base_url, route);
        debug!("POST {} (upload, {} bytes)", url, bytes.len());

        let request = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(API_ARG_HEADER, header_arg(arg)?)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        let response = send(request, "Upload").await?;
        Ok(response.json().await?)
    }

    /// Exchange a refresh token for a short-lived access token
    pub async fn refresh_access_token(
        &self,
        app_key: &str,
        app_secret: &str,
        refresh_token: &str,
    ) -> Result<AccessTokenResponse, ConsoleError> {
        debug!("POST {} (token refresh)", self.endpoints.token_url);

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", app_key),
            ("client_secret", app_secret),
        ];

        let response = self
            .client
            .post(&self.endpoints.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token refresh failed: {} - {}", status, body);
            return Err(ConsoleError::AuthError(format!(
                "Token refresh failed: {} - {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

async fn send(request: RequestBuilder, what: &str) -> Result<Response, ConsoleError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!("{} failed: {} - {}", what, status, body);
        return Err(ConsoleError::ApiError {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Serialize an API argument for use as a header value
///
/// Header values must be ASCII, so every non-ASCII character is written as a
/// JSON `\u` escape (surrogate pairs above the BMP).
pub fn header_arg<A: Serialize>(arg: &A) -> Result<String, ConsoleError> {
    let json = serde_json::to_string(arg)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() && !c.is_ascii_control() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(out)
}

/// OAuth token endpoint response
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,

    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub token_type: Option<String>,
}
