// ── Refresh application logic ──
//
// Applies poll results to the DeviceStore. The bulk path replaces the
// whole mapping; the device-scoped path replaces exactly one id. The two
// are never interleaved for the same id within a cycle -- the coordinator
// serializes them.

use std::sync::Arc;

use chrono::Utc;

use super::DeviceStore;
use crate::model::Device;

impl DeviceStore {
    /// Apply a full poll result: wholesale replacement of the mapping.
    ///
    /// Marks the cycle successful and stamps the refresh time.
    pub(crate) fn apply_full_snapshot(&self, devices: Vec<Device>) {
        self.devices.clear();
        for device in devices {
            self.devices.insert(device.id.clone(), Arc::new(device));
        }
        self.rebuild_snapshot();

        let _ = self.last_refresh.send(Some(Utc::now()));
        let _ = self.last_update_success.send(true);
    }

    /// Record a failed cycle. The stale snapshot is left untouched so
    /// consumers keep serving the last good data.
    pub(crate) fn mark_update_failed(&self) {
        let _ = self.last_update_success.send(false);
    }

    /// Replace a single device's record, leaving the rest of the snapshot
    /// and the global success flag alone.
    pub(crate) fn apply_device(&self, device: Device) {
        self.devices.insert(device.id.clone(), Arc::new(device));
        self.rebuild_snapshot();
    }
}
