// ── Device snapshot storage ──

mod device_store;
mod refresh;

pub use device_store::{DeviceStore, Snapshot};
