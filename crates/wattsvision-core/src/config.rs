// ── Bridge configuration ──
//
// Deploy-time constants for the Vision+ cloud plus the runtime knobs the
// host hands in. Core never reads config files: the host constructs a
// `BridgeConfig` and passes it to `setup`.

use std::time::Duration;

use url::Url;

/// Default Vision+ API root.
pub const API_BASE_URL: &str = "https://dev-vision.watts.io/api";

/// OAuth2 authorize endpoint for the Vision+ login tenant.
pub const OAUTH2_AUTHORIZE_URL: &str = "https://visionlogindev.b2clogin.com/visionlogindev.onmicrosoft.com/B2C_1A_VISION_UNIFIEDSIGNUPORSIGNIN/oauth2/v2.0/authorize";

/// OAuth2 token endpoint for the Vision+ login tenant.
pub const OAUTH2_TOKEN_URL: &str = "https://visionlogindev.b2clogin.com/visionlogindev.onmicrosoft.com/B2C_1A_VISION_UNIFIEDSIGNUPORSIGNIN/oauth2/v2.0/token";

/// Scopes requested on every token refresh.
pub const OAUTH2_SCOPES: [&str; 3] = [
    "openid",
    "offline_access",
    "https://visionlogindev.onmicrosoft.com/vision/vision.read",
];

/// Wall-clock polling interval.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(15);

/// Setpoint bounds applied when a report omits them.
pub const DEFAULT_MIN_SETPOINT: f64 = 5.0;
pub const DEFAULT_MAX_SETPOINT: f64 = 35.0;

/// Interface type strings from discovery.
pub const INTERFACE_THERMOSTAT: &str = "action.devices.types.THERMOSTAT";
pub const INTERFACE_SWITCH: &str = "action.devices.types.SWITCH";

/// Configuration for one bridge instance.
///
/// Built by the host, passed to [`crate::lifecycle::setup`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Vision+ API root.
    pub api_base_url: Url,
    /// How often to poll. Zero disables the periodic task.
    pub update_interval: Duration,
    /// Request timeout for API calls.
    pub timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(API_BASE_URL).expect("constant URL parses"),
            update_interval: UPDATE_INTERVAL,
            timeout: Duration::from_secs(30),
        }
    }
}
