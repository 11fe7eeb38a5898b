// ── Thermostat mode taxonomy ──
//
// The vendor reports modes as strings ("Comfort", "Program", ...) and
// accepts writes as numeric codes. The host side only distinguishes
// Heat / Off / Auto. Both directions are total: an unrecognized vendor
// value collapses to `Unknown` instead of failing the poll.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Vendor thermostat mode, as it appears in device reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum ThermostatMode {
    Comfort,
    Off,
    Eco,
    Defrost,
    Timer,
    Program,
    Unknown,
}

impl ThermostatMode {
    /// Parse the report string form; anything unrecognized is `Unknown`.
    pub fn from_report(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Unknown)
    }

    /// Numeric code used by the set-mode command.
    ///
    /// `None` for `Unknown`, which is not writable.
    pub fn code(self) -> Option<u8> {
        match self {
            Self::Comfort => Some(1),
            Self::Off => Some(2),
            Self::Eco => Some(3),
            Self::Defrost => Some(4),
            Self::Timer => Some(5),
            Self::Program => Some(6),
            Self::Unknown => None,
        }
    }
}

/// Host-facing HVAC mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum HvacMode {
    Heat,
    Off,
    Auto,
    Unknown,
}

impl From<ThermostatMode> for HvacMode {
    fn from(mode: ThermostatMode) -> Self {
        match mode {
            ThermostatMode::Comfort
            | ThermostatMode::Eco
            | ThermostatMode::Defrost
            | ThermostatMode::Timer => Self::Heat,
            ThermostatMode::Off => Self::Off,
            ThermostatMode::Program => Self::Auto,
            ThermostatMode::Unknown => Self::Unknown,
        }
    }
}

impl HvacMode {
    /// The vendor mode a write should use; `None` when not writable.
    pub fn to_vendor(self) -> Option<ThermostatMode> {
        match self {
            Self::Heat => Some(ThermostatMode::Comfort),
            Self::Off => Some(ThermostatMode::Off),
            Self::Auto => Some(ThermostatMode::Program),
            Self::Unknown => None,
        }
    }
}
