// ── Device types ──

use serde::{Deserialize, Serialize};

use super::mode::ThermostatMode;

/// Opaque vendor device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Temperature unit reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Parse the report's unit string (`"C"` / `"F"`), defaulting to Celsius.
    pub fn from_report(raw: Option<&str>) -> Self {
        match raw {
            Some(u) if u.eq_ignore_ascii_case("f") => Self::Fahrenheit,
            _ => Self::Celsius,
        }
    }
}

/// Thermostat-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatState {
    pub current_temperature: Option<f64>,
    pub setpoint: Option<f64>,
    pub mode: ThermostatMode,
    pub min_setpoint: f64,
    pub max_setpoint: f64,
    pub temperature_unit: TemperatureUnit,
    pub available_modes: Vec<String>,
}

/// Switch-specific state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchState {
    pub is_on: bool,
}

/// Kind-specific payload, discriminated by the vendor interface string
/// at conversion time. Entity construction filters on this discriminant
/// instead of inspecting loose fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceKind {
    Thermostat(ThermostatState),
    Switch(SwitchState),
}

/// The canonical device record held in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: Option<String>,
    pub room: Option<String>,
    pub device_type: Option<String>,
    pub is_online: bool,
    pub kind: DeviceKind,
}

impl Device {
    pub fn as_thermostat(&self) -> Option<&ThermostatState> {
        match &self.kind {
            DeviceKind::Thermostat(state) => Some(state),
            DeviceKind::Switch(_) => None,
        }
    }

    pub fn as_switch(&self) -> Option<&SwitchState> {
        match &self.kind {
            DeviceKind::Switch(state) => Some(state),
            DeviceKind::Thermostat(_) => None,
        }
    }
}
