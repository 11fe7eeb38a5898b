// Watts Vision+ HTTP client
//
// Wraps `reqwest::Client` with voice-control URL construction and bearer
// auth. The endpoint methods live in `devices.rs` as inherent methods so
// this module stays focused on transport mechanics.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::AuthProvider;
use crate::error::Error;

/// Raw HTTP client for the Vision+ voice-control API.
///
/// Every request fetches a valid bearer token from the [`AuthProvider`]
/// first, so a token is never sent after its expiry window has closed.
/// No retries and no backoff: any non-2xx response or transport failure
/// surfaces as an [`Error`] to the caller.
pub struct VisionClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<AuthProvider>,
}

impl VisionClient {
    /// Create a new client. `base_url` is the API root
    /// (e.g. `https://dev-vision.watts.io/api`).
    pub fn new(http: reqwest::Client, base_url: Url, auth: Arc<AuthProvider>) -> Self {
        Self {
            http,
            base_url,
            auth,
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The auth provider backing this client.
    pub fn auth(&self) -> &Arc<AuthProvider> {
        &self.auth
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL under the voice-control root:
    /// `{base}/voice-control/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/voice-control/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an authenticated GET request and deserialize the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let token = self.auth.access_token().await?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send an authenticated POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let token = self.auth.access_token().await?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Check the status and deserialize the JSON body.
    ///
    /// An empty success body is treated as JSON `null` so that
    /// fire-and-forget command responses parse without special casing.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "bearer token rejected".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let body = if body.trim().is_empty() {
            "null".to_owned()
        } else {
            body
        };

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
