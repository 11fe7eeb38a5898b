// Wire types for the Vision+ voice-control API.
//
// Field names mirror the JSON payloads exactly (camelCase on the wire).
// `#[serde(default)]` is used liberally because reports are inconsistent
// about field presence across device generations.

use serde::{Deserialize, Serialize};

// ── Discovery ────────────────────────────────────────────────────────

/// Envelope returned by the discovery endpoint: `{ "devices": [...] }`.
#[derive(Debug, Deserialize)]
pub struct DiscoverResponse {
    #[serde(default)]
    pub devices: Vec<DeviceSummary>,
}

/// Device summary from discovery. Carries identity and placement; the
/// live values come from the per-device report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub device_id: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// Interface type string, e.g. `action.devices.types.THERMOSTAT`.
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Report ───────────────────────────────────────────────────────────

/// Live per-device report. Thermostats and switches share this shape;
/// fields not applicable to the device kind are simply absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReport {
    #[serde(default)]
    pub is_online: Option<bool>,

    // Thermostat fields
    #[serde(default)]
    pub current_temperature: Option<f64>,
    #[serde(default)]
    pub setpoint: Option<f64>,
    /// Mode string as reported: "Comfort", "Off", "Eco", "Defrost",
    /// "Timer", "Program".
    #[serde(default)]
    pub thermostat_mode: Option<String>,
    #[serde(default)]
    pub min_allowed_temperature: Option<f64>,
    #[serde(default)]
    pub max_allowed_temperature: Option<f64>,
    /// `"C"` or `"F"`.
    #[serde(default)]
    pub temperature_unit: Option<String>,
    #[serde(default)]
    pub available_thermostat_modes: Vec<String>,

    // Switch fields
    #[serde(default)]
    pub is_turned_on: Option<bool>,
}

// ── Aggregate ────────────────────────────────────────────────────────

/// Merged summary ∪ report for one device, as produced by
/// [`crate::VisionClient::get_all_devices_data`].
#[derive(Debug, Clone)]
pub struct RawDevice {
    pub summary: DeviceSummary,
    pub report: DeviceReport,
}
