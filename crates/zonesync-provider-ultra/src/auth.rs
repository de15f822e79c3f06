// # Token Manager
//
// Owns the bearer token used for every API call.
//
// ## Lifecycle
//
// - No token until the first request needs one (lazy login)
// - `POST /v2/authorization/token` with a password grant
// - The session is replaced wholesale on refresh; it is never persisted
// - `expires_in` is kept as a hint only: renewal happens when the API
//   answers 401, not on a timer
//
// ## Security
//
// Password and tokens never appear in logs or `Debug` output.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use zonesync_core::{Error, Result};

/// Path of the credential exchange endpoint
pub const TOKEN_PATH: &str = "/v2/authorization/token";

/// Production API host
pub const PRODUCTION_HOST: &str = "https://restapi.ultradns.com";

/// Test API host
pub const TEST_HOST: &str = "https://test-restapi.ultradns.com";

/// API credentials
///
/// Immutable after construction.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    account_name: String,
    test_endpoint: bool,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        account_name: impl Into<String>,
        test_endpoint: bool,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            account_name: account_name.into(),
            test_endpoint,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Account new zones are created under
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn test_endpoint(&self) -> bool {
        self.test_endpoint
    }

    /// API host selected by the endpoint flag
    pub fn base_url(&self) -> &'static str {
        if self.test_endpoint {
            TEST_HOST
        } else {
            PRODUCTION_HOST
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("account_name", &self.account_name)
            .field("test_endpoint", &self.test_endpoint)
            .finish()
    }
}

/// An authenticated session
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// When the provider said the token expires, if it said
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the expiry hint has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<REDACTED>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<REDACTED>"))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response
///
/// The API has been seen spelling `token_type` as `"token type"`, and
/// sending `expires_in` as a string.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(alias = "token type")]
    token_type: Option<String>,
    expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    fn into_session(self) -> Result<Session> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::protocol("Token response has no access_token"))?;

        let expires_at = match self.expires_in {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => {
                let expires_at = match &value {
                    serde_json::Value::Number(n) => n.as_i64(),
                    serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .and_then(Duration::try_seconds)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                .ok_or_else(|| {
                    Error::protocol(format!("Token response has malformed expires_in: {}", value))
                })?;
                Some(expires_at)
            }
        };

        Ok(Session {
            access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at,
        })
    }
}

/// Holds the current session and performs the credential exchange
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    credentials: Credentials,
    session: RwLock<Option<Session>>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl TokenManager {
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            credentials,
            session: RwLock::new(None),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Current access token, logging in first if there is no session
    pub async fn token(&self) -> Result<String> {
        if let Some(session) = self.session.read().await.as_ref() {
            if session.is_expired() {
                debug!("Access token is past its expiry hint; keeping it until the API rejects it");
            }
            return Ok(session.access_token.clone());
        }

        let mut guard = self.session.write().await;
        // another caller may have logged in while we waited for the lock
        if let Some(session) = guard.as_ref() {
            return Ok(session.access_token.clone());
        }
        let session = self.authenticate().await?;
        let token = session.access_token.clone();
        *guard = Some(session);
        Ok(token)
    }

    /// Discard the current session and log in again
    pub async fn refresh(&self) -> Result<String> {
        let mut guard = self.session.write().await;
        *guard = None;
        let session = self.authenticate().await?;
        let token = session.access_token.clone();
        *guard = Some(session);
        Ok(token)
    }

    /// Snapshot of the current session, if logged in
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Perform the credential exchange
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /v2/authorization/token
    /// Content-Type: application/x-www-form-urlencoded
    ///
    /// grant_type=password&username=<user>&password=<pass>
    /// ```
    ///
    /// # Errors
    ///
    /// - 401/403: `Error::Authentication("Unauthorized")`
    /// - other non-2xx: `Error::Request` carrying the response body
    /// - unusable body: `Error::Protocol`
    pub async fn authenticate(&self) -> Result<Session> {
        debug!("Requesting access token for {}", self.credentials.username);

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::http(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        match status.as_u16() {
            200..=299 => {}
            401 | 403 => {
                warn!("Login rejected for {} ({})", self.credentials.username, status);
                return Err(Error::auth("Unauthorized"));
            }
            code => return Err(Error::request(code, body)),
        }

        let response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::protocol(format!("Malformed token response: {}", e)))?;
        let session = response.into_session()?;

        debug!("Obtained {} token for {}", session.token_type, self.credentials.username);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_selection() {
        let prod = Credentials::new("user", "pass", "acct", false);
        let test = Credentials::new("user", "pass", "acct", true);
        assert_eq!(prod.base_url(), "https://restapi.ultradns.com");
        assert_eq!(test.base_url(), "https://test-restapi.ultradns.com");
    }

    #[test]
    fn test_token_response_with_spaced_token_type() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"token type": "Bearer", "refresh_token": "abc", "access_token":"123", "expires_in": "3600"}"#,
        )
        .unwrap();
        let session = response.into_session().unwrap();

        assert_eq!(session.access_token, "123");
        assert_eq!(session.refresh_token.as_deref(), Some("abc"));
        assert_eq!(session.token_type, "Bearer");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_token_response_numeric_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"123", "expires_in": 0}"#).unwrap();
        let session = response.into_session().unwrap();
        assert!(session.is_expired());
    }

    #[test]
    fn test_token_response_missing_access_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"refresh_token": "abc"}"#).unwrap();
        assert!(matches!(response.into_session(), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_token_response_malformed_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"123", "expires_in": "soon"}"#).unwrap();
        assert!(matches!(response.into_session(), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_secrets_not_exposed_in_debug() {
        let credentials = Credentials::new("user", "secret_pass_123", "acct", false);
        let debug_str = format!("{:?}", credentials);
        assert!(!debug_str.contains("secret_pass_123"));
        assert!(debug_str.contains("Credentials"));

        let session = Session {
            access_token: "secret_token_456".to_string(),
            refresh_token: Some("secret_refresh_789".to_string()),
            token_type: "Bearer".to_string(),
            expires_at: None,
        };
        let debug_str = format!("{:?}", session);
        assert!(!debug_str.contains("secret_token_456"));
        assert!(!debug_str.contains("secret_refresh_789"));
    }
}
