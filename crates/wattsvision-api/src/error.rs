use thiserror::Error;

/// Top-level error type for the `wattsvision-api` crate.
///
/// Covers every failure mode across the API surface: OAuth token exchange,
/// transport, and the voice-control endpoints. `wattsvision-core` maps
/// these into host-facing variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token refresh rejected (expired/revoked grant, bad client id)
    /// or a bearer token rejected by the API.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response from the Vision API.
    #[error("Vision API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the credentials themselves are
    /// bad and re-authentication is required.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Api { status: 401 | 403, .. }
        )
    }

    /// Returns `true` if this is a transient error that may clear on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
