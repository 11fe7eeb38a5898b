// ── Canonical device model ──
//
// Every type here is the bridge's own representation of a Vision+ device,
// decoupled from the wire shapes in `wattsvision_api::models`. Conversion
// lives in `crate::convert`.

mod device;
mod mode;

pub use device::{Device, DeviceId, DeviceKind, SwitchState, TemperatureUnit, ThermostatState};
pub use mode::{HvacMode, ThermostatMode};
