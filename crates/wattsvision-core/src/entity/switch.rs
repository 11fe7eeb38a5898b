// Switch adapter for Vision+ on/off devices.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::command::Command;
use crate::coordinator::Coordinator;
use crate::model::{Device, DeviceId};

/// Read/write facade for one on/off device.
pub struct SwitchEntity {
    coordinator: Coordinator,
    device_id: DeviceId,
}

impl SwitchEntity {
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

    // ── Reads ────────────────────────────────────────────────────

    /// Whether the switch is on; `None` when the device is missing from
    /// the snapshot.
    pub fn is_on(&self) -> Option<bool> {
        self.device().and_then(|d| d.as_switch().map(|s| s.is_on))
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

    pub async fn turn_on(&self) {
        self.set_state(true).await;
    }

    pub async fn turn_off(&self) {
        self.set_state(false).await;
    }

    /// A failed command is logged and swallowed; a successful one
    /// triggers exactly one immediate refresh.
    async fn set_state(&self, is_on: bool) {
        let command = Command::SetSwitchState {
            device_id: self.device_id.clone(),
            is_on,
        };

        match self.coordinator.execute(command).await {
            Ok(_) => {
                debug!(device_id = %self.device_id, is_on, "set switch state");
                if let Err(err) = self.coordinator.request_refresh().await {
                    warn!(device_id = %self.device_id, error = %err, "post-command refresh failed");
                }
            }
            Err(err) => {
                error!(device_id = %self.device_id, error = %err, "error setting switch state");
            }
        }
    }
}
