// Climate adapter for Vision+ thermostats.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::command::Command;
use crate::config::{DEFAULT_MAX_SETPOINT, DEFAULT_MIN_SETPOINT};
use crate::coordinator::Coordinator;
use crate::model::{Device, DeviceId, HvacMode, TemperatureUnit, ThermostatMode, ThermostatState};

/// Read/write facade for one thermostat.
///
/// All reads go through the coordinator's snapshot; a device id that has
/// dropped out of the snapshot reads as unavailable.
pub struct ClimateEntity {
    coordinator: Coordinator,
    device_id: DeviceId,
}

impl ClimateEntity {
    pub(crate) fn new(coordinator: Coordinator, device_id: DeviceId) -> Self {
        Self {
            coordinator,
            device_id,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Display name from the last snapshot.
    pub fn name(&self) -> Option<String> {
        self.device().and_then(|d| d.name.clone())
    }

    fn device(&self) -> Option<Arc<Device>> {
        self.coordinator.device(&self.device_id)
    }

    fn thermostat(&self) -> Option<ThermostatState> {
        self.device().and_then(|d| d.as_thermostat().cloned())
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn current_temperature(&self) -> Option<f64> {
        self.thermostat().and_then(|t| t.current_temperature)
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.thermostat().and_then(|t| t.setpoint)
    }

    /// Host-facing HVAC mode, mapped from the vendor mode.
    pub fn hvac_mode(&self) -> Option<HvacMode> {
        self.thermostat().map(|t| t.mode.into())
    }

    /// The raw vendor mode, for hosts that surface extra attributes.
    pub fn vendor_mode(&self) -> Option<ThermostatMode> {
        self.thermostat().map(|t| t.mode)
    }

    pub fn min_temp(&self) -> f64 {
        self.thermostat()
            .map_or(DEFAULT_MIN_SETPOINT, |t| t.min_setpoint)
    }

    pub fn max_temp(&self) -> f64 {
        self.thermostat()
            .map_or(DEFAULT_MAX_SETPOINT, |t| t.max_setpoint)
    }

    pub fn temperature_unit(&self) -> Option<TemperatureUnit> {
        self.thermostat().map(|t| t.temperature_unit)
    }

    /// Vendor mode strings the device advertises as selectable.
    pub fn available_modes(&self) -> Vec<String> {
        self.thermostat().map(|t| t.available_modes).unwrap_or_default()
    }

    pub fn room(&self) -> Option<String> {
        self.device().and_then(|d| d.room.clone())
    }

    pub fn device_type(&self) -> Option<String> {
        self.device().and_then(|d| d.device_type.clone())
    }

    /// Available = the last poll succeeded and the device is online.
    pub fn available(&self) -> bool {
        self.coordinator.last_update_success() && self.device().is_some_and(|d| d.is_online)
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Set the target temperature.
    ///
    /// A failed command is logged and swallowed; the entity keeps
    /// reporting the previous value until the next successful poll. A
    /// successful command triggers exactly one immediate refresh.
    pub async fn set_temperature(&self, temperature: f64) {
        let command = Command::SetTemperature {
            device_id: self.device_id.clone(),
            temperature,
        };

        match self.coordinator.execute(command).await {
            Ok(_) => {
                debug!(device_id = %self.device_id, temperature, "set temperature");
                if let Err(err) = self.coordinator.request_refresh().await {
                    warn!(device_id = %self.device_id, error = %err, "post-command refresh failed");
                }
            }
            Err(err) => {
                error!(device_id = %self.device_id, error = %err, "error setting temperature");
            }
        }
    }

    /// Set the HVAC mode. Same command contract as
    /// [`set_temperature`](Self::set_temperature).
    pub async fn set_hvac_mode(&self, mode: HvacMode) {
        let command = Command::SetMode {
            device_id: self.device_id.clone(),
            mode,
        };

        match self.coordinator.execute(command).await {
            Ok(_) => {
                debug!(device_id = %self.device_id, %mode, "set HVAC mode");
                if let Err(err) = self.coordinator.request_refresh().await {
                    warn!(device_id = %self.device_id, error = %err, "post-command refresh failed");
                }
            }
            Err(err) => {
                error!(device_id = %self.device_id, error = %err, "error setting HVAC mode");
            }
        }
    }
}
