// Voice-control endpoints
//
// Discovery, per-device reports, and the three write commands. URL layout
// follows the vendor's Google voice-control surface:
//
//   GET  voice-control/discover/Google
//   GET  voice-control/report/Google/{device_id}
//   POST voice-control/control/thermostat/Google/{device_id}/set-temperature
//   POST voice-control/control/thermostat/Google/{device_id}/set-mode
//   POST voice-control/control/on-off/Google/{device_id}/change-state

use std::collections::HashMap;

use serde_json::json;
use tracing::debug;

use crate::client::VisionClient;
use crate::error::Error;
use crate::models::{DeviceReport, DeviceSummary, DiscoverResponse, RawDevice};

impl VisionClient {
    /// List every device registered to the account.
    ///
    /// `GET voice-control/discover/Google`
    pub async fn discover_devices(&self) -> Result<Vec<DeviceSummary>, Error> {
        let url = self.api_url("discover/Google")?;
        debug!("discovering devices");
        let resp: DiscoverResponse = self.get(url).await?;
        Ok(resp.devices)
    }

    /// Fetch the live report for a single device.
    ///
    /// `GET voice-control/report/Google/{device_id}`
    pub async fn get_device_report(&self, device_id: &str) -> Result<DeviceReport, Error> {
        let url = self.api_url(&format!("report/Google/{device_id}"))?;
        self.get(url).await
    }

    /// Discovery plus one report fetch per discovered device, merged per id.
    ///
    /// Reports are fetched sequentially after discovery completes. Any
    /// single failing report fails the whole aggregate -- a caller either
    /// gets a complete snapshot or none.
    pub async fn get_all_devices_data(&self) -> Result<HashMap<String, RawDevice>, Error> {
        let devices = self.discover_devices().await?;

        let mut data = HashMap::with_capacity(devices.len());
        for summary in devices {
            let report = self.get_device_report(&summary.device_id).await?;
            data.insert(summary.device_id.clone(), RawDevice { summary, report });
        }
        Ok(data)
    }

    /// Set a thermostat's target temperature.
    ///
    /// The response body is not interpreted beyond the status code.
    pub async fn set_thermostat_temperature(
        &self,
        device_id: &str,
        temperature: f64,
    ) -> Result<(), Error> {
        let url =
            self.api_url(&format!("control/thermostat/Google/{device_id}/set-temperature"))?;
        debug!(device_id, temperature, "setting thermostat temperature");
        let _: serde_json::Value = self
            .post(url, &json!({ "targetTemperature": temperature }))
            .await?;
        Ok(())
    }

    /// Set a thermostat's operating mode.
    ///
    /// `mode` is the numeric vendor code: 1=Comfort, 2=Off, 3=Eco,
    /// 4=Defrost, 5=Timer, 6=Program.
    pub async fn set_thermostat_mode(&self, device_id: &str, mode: u8) -> Result<(), Error> {
        let url = self.api_url(&format!("control/thermostat/Google/{device_id}/set-mode"))?;
        debug!(device_id, mode, "setting thermostat mode");
        let _: serde_json::Value = self.post(url, &json!({ "mode": mode })).await?;
        Ok(())
    }

    /// Turn an on/off device on or off.
    pub async fn set_switch_state(&self, device_id: &str, is_on: bool) -> Result<(), Error> {
        let url = self.api_url(&format!("control/on-off/Google/{device_id}/change-state"))?;
        debug!(device_id, is_on, "setting switch state");
        let _: serde_json::Value = self.post(url, &json!({ "isTurnedOn": is_on })).await?;
        Ok(())
    }
}
