// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// coordinator routes each variant through a processor task to the
// corresponding Vision API call, so writes are serialized with respect
// to each other.

use crate::error::CoreError;
use crate::model::{DeviceId, HvacMode};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against the Vision+ API.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set a thermostat's target temperature.
    SetTemperature {
        device_id: DeviceId,
        temperature: f64,
    },
    /// Set a thermostat's operating mode.
    SetMode {
        device_id: DeviceId,
        mode: HvacMode,
    },
    /// Turn an on/off device on or off.
    SetSwitchState { device_id: DeviceId, is_on: bool },
}

/// Result of a successfully executed command. Commands are fire-and-forget
/// from the coordinator's point of view: the caller triggers a refresh to
/// observe the effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
}
