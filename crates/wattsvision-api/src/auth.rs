// OAuth2 token management for the Watts Vision+ cloud.
//
// The vendor issues short-lived bearer tokens through an Azure B2C token
// endpoint. `AuthProvider` owns the token state and guarantees that no API
// request is ever sent with a token known to be expired: callers go through
// `access_token()`, which refreshes first once the expiry window has closed.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Refresh this long before the recorded expiry, to absorb clock skew and
/// request latency.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Fallback token lifetime when the endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// OAuth2 endpoint and client identity for the Vision+ login tenant.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub token_url: Url,
    pub scopes: Vec<String>,
}

/// A bearer token plus the refresh credential that renews it.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Whether the access token is still usable at `now` (expiry minus skew).
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }
}

/// Shape of the token endpoint response. `refresh_token` is optional:
/// the tenant only rotates it sometimes, and a missing value means
/// "keep using the previous one".
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Owns OAuth2 token state and refreshes it before expiry.
///
/// No internal retry: a failed refresh surfaces immediately and the caller
/// decides what to do. The stored token is mutated only here.
pub struct AuthProvider {
    http: reqwest::Client,
    config: OAuthConfig,
    token: Mutex<Token>,
}

impl AuthProvider {
    pub fn new(http: reqwest::Client, config: OAuthConfig, initial: Token) -> Self {
        Self {
            http,
            config,
            token: Mutex::new(initial),
        }
    }

    /// Return a valid access token, refreshing first if needed.
    ///
    /// HTTP 4xx from the token endpoint means the grant itself is bad
    /// ([`Error::Authentication`]); transport failures pass through as
    /// [`Error::Transport`].
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut token = self.token.lock().await;
        if token.is_valid(Utc::now()) {
            return Ok(token.access_token.expose_secret().to_owned());
        }

        debug!("access token expired, refreshing");
        *token = self.refresh(&token).await?;
        Ok(token.access_token.expose_secret().to_owned())
    }

    /// Blocking bridge for callers outside the async runtime.
    ///
    /// Hands the refresh off to the event loop behind `handle` and blocks
    /// the current thread until it resolves. Must not be called from a
    /// runtime worker thread.
    pub fn blocking_access_token(
        &self,
        handle: &tokio::runtime::Handle,
    ) -> Result<String, Error> {
        handle.block_on(self.access_token())
    }

    /// Snapshot of the current token state.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    async fn refresh(&self, current: &Token) -> Result<Token, Error> {
        let scope = self.config.scopes.join(" ");
        let resp = self
            .http
            .post(self.config.token_url.clone())
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.config.client_id.as_str()),
                ("refresh_token", current.refresh_token.expose_secret()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token endpoint rejected refresh (HTTP {status}): {body}"),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        let refresh_token = parsed
            .refresh_token
            .map_or_else(|| current.refresh_token.clone(), SecretString::from);

        debug!("token refresh successful");
        Ok(Token {
            access_token: SecretString::from(parsed.access_token),
            refresh_token,
            expires_at: Utc::now()
                + TimeDelta::seconds(parsed.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)),
        })
    }
}
