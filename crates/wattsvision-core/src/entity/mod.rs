// ── Entity adapters ──
//
// Read/write facades over the coordinator, one per device. An adapter
// holds a coordinator handle plus a device id -- composition instead of
// the base-class inheritance a host framework would impose. Reads for
// ids missing from the snapshot return the defined "unavailable" values
// rather than failing.

mod climate;
mod switch;

pub use climate::ClimateEntity;
pub use switch::SwitchEntity;

use tracing::debug;

use crate::coordinator::Coordinator;
use crate::model::DeviceKind;

/// Build entity adapters from the current snapshot, split by device kind.
pub fn build_entities(coordinator: &Coordinator) -> (Vec<ClimateEntity>, Vec<SwitchEntity>) {
    let snapshot = coordinator.store().snapshot();

    let mut climates = Vec::new();
    let mut switches = Vec::new();

    for device in snapshot.values() {
        match device.kind {
            DeviceKind::Thermostat(_) => {
                climates.push(ClimateEntity::new(coordinator.clone(), device.id.clone()));
            }
            DeviceKind::Switch(_) => {
                switches.push(SwitchEntity::new(coordinator.clone(), device.id.clone()));
            }
        }
    }

    debug!(
        climates = climates.len(),
        switches = switches.len(),
        "built entity adapters"
    );
    (climates, switches)
}
