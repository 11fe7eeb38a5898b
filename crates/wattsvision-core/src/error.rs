// ── Core error types ──
//
// Host-facing errors from wattsvision-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly; the
// `From<wattsvision_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

use wattsvision_api::Error as ApiError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Setup errors ─────────────────────────────────────────────────
    /// Credentials are invalid or expired. Fatal to setup; user
    /// re-authentication required, never retried automatically.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The vendor API is temporarily unreachable. The host retries setup
    /// on its own schedule.
    #[error("Integration not ready: {reason}")]
    NotReady { reason: String },

    // ── Steady-state errors ──────────────────────────────────────────
    /// A polling cycle failed; the coordinator serves the last snapshot
    /// stale until the next successful poll.
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// A write command was rejected before reaching the API.
    #[error("Command rejected: {message}")]
    CommandRejected { message: String },

    /// The coordinator has been shut down or was never started.
    #[error("Coordinator closed")]
    CoordinatorClosed,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for CoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Authentication { message } => Self::AuthenticationFailed { message },
            ApiError::Api { status: 401, message } => Self::AuthenticationFailed { message },
            ApiError::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            ApiError::Transport(e) => Self::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            ApiError::InvalidUrl(e) => Self::Internal(format!("invalid URL: {e}")),
            ApiError::Deserialization { message, body: _ } => {
                Self::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// Classify an API-layer failure for the setup path: bad credentials
    /// are fatal, everything else is a retryable not-ready.
    pub(crate) fn for_setup(err: ApiError) -> Self {
        if err.is_auth_error() {
            Self::AuthenticationFailed {
                message: err.to_string(),
            }
        } else {
            Self::NotReady {
                reason: err.to_string(),
            }
        }
    }

    /// Classify an API-layer failure for the polling path.
    pub(crate) fn for_update(err: &ApiError) -> Self {
        Self::UpdateFailed {
            message: format!("API error: {err}"),
        }
    }
}
