// ── Reactive device store ──
//
// Thread-safe storage for the device snapshot. The coordinator is the
// only writer; entities and host subscribers read lock-free through
// `DashMap` and a `watch`-published snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Device, DeviceId};

/// Snapshot handed to subscribers: one cheap `Arc` clone per read.
pub type Snapshot = Arc<HashMap<DeviceId, Arc<Device>>>;

/// The latest known mapping from device id to device record, plus the
/// bookkeeping the coordinator exposes to consumers: whether the last
/// update succeeded and when the last successful refresh happened.
pub struct DeviceStore {
    pub(crate) devices: DashMap<DeviceId, Arc<Device>>,
    pub(crate) snapshot: watch::Sender<Snapshot>,
    pub(crate) last_update_success: watch::Sender<bool>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceStore {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(HashMap::new()));
        let (last_update_success, _) = watch::channel(false);
        let (last_refresh, _) = watch::channel(None);

        Self {
            devices: DashMap::new(),
            snapshot,
            last_update_success,
            last_refresh,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Look up one device by id.
    pub fn get(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.get(id).map(|r| Arc::clone(r.value()))
    }

    /// The current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// All currently known device ids.
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Whether the most recent update cycle succeeded.
    pub fn last_update_success(&self) -> bool {
        *self.last_update_success.borrow()
    }

    /// When the last successful full refresh happened, if ever.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How stale the snapshot is, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::TimeDelta> {
        self.last_refresh().map(|t| Utc::now() - t)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Subscribe to the update-success flag.
    pub fn subscribe_success(&self) -> watch::Receiver<bool> {
        self.last_update_success.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect the current mapping and broadcast it to subscribers.
    pub(crate) fn rebuild_snapshot(&self) {
        let map: HashMap<DeviceId, Arc<Device>> = self
            .devices
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(map));
    }
}
