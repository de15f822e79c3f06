//! Authenticated UltraDNS REST client
//!
//! Every request carries `Authorization: Bearer <token>`. A 401 from any
//! endpoint triggers exactly one re-authentication and one retry of the
//! original request; a second 401 is terminal. Nothing else is retried.

use crate::auth::{Credentials, TokenManager};
use crate::wire;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use zonesync_core::{Error, Result};

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Low-level API client
#[derive(Debug)]
pub struct UltraClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenManager,
}

impl UltraClient {
    /// Client for the host selected by `credentials`
    pub fn new(credentials: Credentials) -> Result<Self> {
        let base_url = credentials.base_url().to_string();
        Self::with_base_url(credentials, base_url)
    }

    /// Client for an explicit API host (e.g. a mock server)
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let tokens = TokenManager::new(http.clone(), &base_url, credentials);

        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        self.tokens.credentials()
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.request(Method::GET, path, query, None).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", path, e)))?;
        serde_json::from_str(&body)
            .map_err(|e| Error::protocol(format!("Malformed response from {}: {}", path, e)))
    }

    /// Send `body` as JSON, ignoring the response body
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.request(method, path, &[], Some(&body)).await?;
        Ok(())
    }

    /// DELETE `path`
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    /// Issue one request, re-authenticating once on 401
    ///
    /// # Errors
    ///
    /// - second 401: `Error::Authentication("Unauthorized")`
    /// - "Data not found" error body: `Error::NotFound`
    /// - any other non-2xx: `Error::Request` with the body verbatim
    /// - transport failure: `Error::Http`
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut token = self.tokens.token().await?;
        let mut reauthenticated = false;

        loop {
            debug!("{} {}", method, path);

            let mut builder = self.http.request(method.clone(), &url).bearer_auth(&token);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Error::http(format!("{} {} failed: {}", method, path, e)))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                if reauthenticated {
                    warn!("{} {} still unauthorized after re-authentication", method, path);
                    return Err(Error::auth("Unauthorized"));
                }
                warn!("{} {} returned 401, re-authenticating", method, path);
                token = self.tokens.refresh().await?;
                reauthenticated = true;
                continue;
            }

            if status.is_success() {
                return Ok(response);
            }

            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            if let Some(not_found) = wire::data_not_found(&text) {
                debug!("{} {}: {}", method, path, not_found.error_message);
                return Err(Error::not_found(not_found.error_message));
            }

            return Err(Error::request(status.as_u16(), text));
        }
    }
}
