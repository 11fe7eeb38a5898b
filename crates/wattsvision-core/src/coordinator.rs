// ── Update coordinator ──
//
// Owns the polling lifecycle for one Vision+ account: initial refresh,
// fixed-interval polling, on-demand refresh after writes, device-scoped
// refresh, and command routing. The coordinator is the only writer to
// the DeviceStore; entities read through it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wattsvision_api::VisionClient;

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::BridgeConfig;
use crate::convert::{apply_report, device_from_raw};
use crate::error::CoreError;
use crate::model::{Device, DeviceId, ThermostatMode};
use crate::store::DeviceStore;

const COMMAND_CHANNEL_SIZE: usize = 16;

// ── CoordinatorState ─────────────────────────────────────────────

/// Coordinator lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Constructed; no successful refresh yet.
    Uninitialized,
    /// Last refresh succeeded; the snapshot is current.
    Ready,
    /// A refresh failed after initialization; the snapshot is served
    /// stale until the next successful poll.
    Stale,
}

// ── Coordinator ──────────────────────────────────────────────────

/// The polling data coordinator.
///
/// Cheaply cloneable via `Arc`. Constructed by [`crate::lifecycle::setup`]
/// and handed to every entity adapter; there is exactly one per bridge
/// instance, no ambient registry.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: Arc<VisionClient>,
    config: BridgeConfig,
    store: DeviceStore,
    state: watch::Sender<CoordinatorState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator. Does NOT fetch -- call
    /// [`first_refresh`](Self::first_refresh) and then
    /// [`start`](Self::start) to begin polling.
    pub fn new(client: Arc<VisionClient>, config: BridgeConfig) -> Self {
        let (state, _) = watch::channel(CoordinatorState::Uninitialized);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                config,
                store: DeviceStore::new(),
                state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the device store.
    pub fn store(&self) -> &DeviceStore {
        &self.inner.store
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CoordinatorState {
        *self.inner.state.borrow()
    }

    /// Subscribe to lifecycle state changes.
    pub fn watch_state(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    /// Whether the most recent update cycle succeeded.
    pub fn last_update_success(&self) -> bool {
        self.inner.store.last_update_success()
    }

    /// Look up one device from the latest snapshot.
    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.inner.store.get(id)
    }

    // ── Refresh paths ────────────────────────────────────────────

    /// Initial forced refresh: `Uninitialized -> Ready`.
    ///
    /// On failure the coordinator stays `Uninitialized` and the error
    /// propagates so setup can fail as not-ready.
    pub async fn first_refresh(&self) -> Result<(), CoreError> {
        self.refresh().await?;
        info!(devices = self.inner.store.len(), "initial refresh complete");
        Ok(())
    }

    /// On-demand refresh outside the timer (e.g. right after a write).
    ///
    /// Same fetch path and state transition rules as the periodic tick.
    pub async fn request_refresh(&self) -> Result<(), CoreError> {
        self.refresh().await
    }

    /// The shared fetch path: bulk fetch, wholesale apply, transition.
    ///
    /// On failure the stale snapshot is left untouched and the
    /// coordinator goes `Stale` (unless it was never initialized).
    async fn refresh(&self) -> Result<(), CoreError> {
        match self.inner.client.get_all_devices_data().await {
            Ok(raw) => {
                let devices: Vec<Device> =
                    raw.into_values().filter_map(device_from_raw).collect();
                debug!(devices = devices.len(), "refresh complete");
                self.inner.store.apply_full_snapshot(devices);
                let _ = self.inner.state.send(CoordinatorState::Ready);
                Ok(())
            }
            Err(err) => {
                self.inner.store.mark_update_failed();
                if self.state() != CoordinatorState::Uninitialized {
                    let _ = self.inner.state.send(CoordinatorState::Stale);
                }
                Err(CoreError::for_update(&err))
            }
        }
    }

    /// Re-fetch exactly one device's report and replace its record.
    ///
    /// Errors are logged and swallowed: the previous record for the
    /// device is retained and global state is unchanged.
    pub async fn refresh_device(&self, device_id: &DeviceId) {
        let Some(current) = self.inner.store.get(device_id) else {
            warn!(%device_id, "refresh requested for unknown device");
            return;
        };

        match self.inner.client.get_device_report(device_id.as_str()).await {
            Ok(report) => {
                self.inner.store.apply_device(apply_report(&current, &report));
                debug!(%device_id, "device refreshed");
            }
            Err(err) => {
                warn!(%device_id, error = %err, "device refresh failed; keeping previous record");
            }
        }
    }

    // ── Background tasks ─────────────────────────────────────────

    /// Spawn the background tasks: the command processor and, unless the
    /// interval is zero, the periodic polling loop.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let coordinator = self.clone();
            handles.push(tokio::spawn(command_processor_task(coordinator, rx)));
        }

        let interval = self.inner.config.update_interval;
        if !interval.is_zero() {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(coordinator, interval, cancel)));
        }
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn close(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator closed");
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write command.
    ///
    /// Sends the command through the internal channel to the processor
    /// task and awaits the result. Fails with
    /// [`CoreError::CoordinatorClosed`] once [`close`](Self::close) has
    /// run.
    pub async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::CoordinatorClosed);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::CoordinatorClosed)?;

        rx.await.map_err(|_| CoreError::CoordinatorClosed)?
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodic polling loop. Failures mark the coordinator stale and keep
/// serving the previous snapshot.
async fn refresh_task(coordinator: Coordinator, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = coordinator.refresh().await {
                    warn!(error = %err, "periodic refresh failed; serving stale data");
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, routing each to the
/// corresponding Vision API call.
async fn command_processor_task(
    coordinator: Coordinator,
    mut rx: mpsc::Receiver<CommandEnvelope>,
) {
    let cancel = coordinator.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&coordinator, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to the corresponding Vision API call.
async fn route_command(
    coordinator: &Coordinator,
    command: Command,
) -> Result<CommandResult, CoreError> {
    let client = &coordinator.inner.client;

    match command {
        Command::SetTemperature {
            device_id,
            temperature,
        } => {
            client
                .set_thermostat_temperature(device_id.as_str(), temperature)
                .await?;
            Ok(CommandResult::Ok)
        }

        Command::SetMode { device_id, mode } => {
            let Some(code) = mode.to_vendor().and_then(ThermostatMode::code) else {
                return Err(CoreError::CommandRejected {
                    message: format!("mode {mode} is not writable"),
                });
            };
            client.set_thermostat_mode(device_id.as_str(), code).await?;
            Ok(CommandResult::Ok)
        }

        Command::SetSwitchState { device_id, is_on } => {
            client.set_switch_state(device_id.as_str(), is_on).await?;
            Ok(CommandResult::Ok)
        }
    }
}
