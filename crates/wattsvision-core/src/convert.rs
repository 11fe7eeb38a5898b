// ── API-to-domain conversion ──
//
// Bridges raw wire types into canonical `Device` records. Normalizes the
// interface discriminant, parses mode strings, and fills the documented
// defaults for missing optional data.

use tracing::debug;

use wattsvision_api::models::{DeviceReport, RawDevice};

use crate::config::{
    DEFAULT_MAX_SETPOINT, DEFAULT_MIN_SETPOINT, INTERFACE_SWITCH, INTERFACE_THERMOSTAT,
};
use crate::model::{
    Device, DeviceId, DeviceKind, SwitchState, TemperatureUnit, ThermostatMode, ThermostatState,
};

fn thermostat_state(report: &DeviceReport) -> ThermostatState {
    ThermostatState {
        current_temperature: report.current_temperature,
        setpoint: report.setpoint,
        mode: report
            .thermostat_mode
            .as_deref()
            .map_or(ThermostatMode::Unknown, ThermostatMode::from_report),
        min_setpoint: report.min_allowed_temperature.unwrap_or(DEFAULT_MIN_SETPOINT),
        max_setpoint: report.max_allowed_temperature.unwrap_or(DEFAULT_MAX_SETPOINT),
        temperature_unit: TemperatureUnit::from_report(report.temperature_unit.as_deref()),
        available_modes: report.available_thermostat_modes.clone(),
    }
}

fn switch_state(report: &DeviceReport) -> SwitchState {
    SwitchState {
        is_on: report.is_turned_on.unwrap_or(false),
    }
}

/// Convert a merged summary ∪ report into a canonical device record.
///
/// Devices with an interface the bridge does not model are dropped here,
/// so the snapshot only ever contains the two supported kinds.
pub(crate) fn device_from_raw(raw: RawDevice) -> Option<Device> {
    let RawDevice { summary, report } = raw;

    let kind = match summary.interface.as_deref() {
        Some(i) if i == INTERFACE_THERMOSTAT => DeviceKind::Thermostat(thermostat_state(&report)),
        Some(i) if i == INTERFACE_SWITCH => DeviceKind::Switch(switch_state(&report)),
        other => {
            debug!(
                device_id = %summary.device_id,
                interface = ?other,
                "skipping device with unsupported interface"
            );
            return None;
        }
    };

    Some(Device {
        id: DeviceId::new(summary.device_id),
        name: summary.friendly_name,
        room: summary.room_name,
        device_type: summary.device_type,
        is_online: report.is_online.unwrap_or(false),
        kind,
    })
}

/// Rebuild a device record from a fresh report, keeping the identity
/// fields discovery provided. Used by the device-scoped refresh path.
pub(crate) fn apply_report(current: &Device, report: &DeviceReport) -> Device {
    let kind = match &current.kind {
        DeviceKind::Thermostat(_) => DeviceKind::Thermostat(thermostat_state(report)),
        DeviceKind::Switch(_) => DeviceKind::Switch(switch_state(report)),
    };

    Device {
        id: current.id.clone(),
        name: current.name.clone(),
        room: current.room.clone(),
        device_type: current.device_type.clone(),
        is_online: report.is_online.unwrap_or(false),
        kind,
    }
}
