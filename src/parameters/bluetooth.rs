//! Bluetooth Parameter Group
//!
//! # Parameters
//!
//! - `BLE_ADV_INTERVAL_MS` - Advertising interval (20 - 10240 ms)
//! - `BLE_TX_POWER` - Transmit power (-40 - 8 dBm)
//! - `BLE_DEVICE_NAME` - Advertised name, zero-padded to 16 bytes
//!
//! The default device name comes from `NVCONFIG_BLE_DEVICE_NAME` at build time.

use super::schema::{name_str, padded_name, settings, NAME_LEN};
use crate::core::config::{ChangeSink, ConfigError, ConfigStore};
use crate::core::kv::KvStore;

/// Bluetooth parameters loaded from the configuration store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleParams {
    /// Advertising interval (ms)
    pub adv_interval_ms: u16,
    /// Transmit power (dBm)
    pub tx_power_dbm: i8,
    /// Zero-padded device name
    pub device_name: [u8; NAME_LEN],
}

impl BleParams {
    /// Load Bluetooth parameters (defaults for anything never written)
    pub fn from_store<S: KvStore, N: ChangeSink>(
        store: &mut ConfigStore<S, N>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            adv_interval_ms: store.read(settings::BLE_ADV_INTERVAL_MS)?,
            tx_power_dbm: store.read(settings::BLE_TX_POWER)?,
            device_name: store.read(settings::BLE_DEVICE_NAME)?,
        })
    }

    /// Persist a new device name
    ///
    /// Names longer than 16 bytes are truncated; empty names are rejected
    /// with `ValidationFailed`.
    pub fn set_device_name<S: KvStore, N: ChangeSink>(
        store: &mut ConfigStore<S, N>,
        name: &str,
    ) -> Result<(), ConfigError> {
        store.write(settings::BLE_DEVICE_NAME, &padded_name(name))
    }

    /// Device name as text (empty if the stored bytes are not UTF-8)
    pub fn device_name(&self) -> &str {
        name_str(&self.device_name).unwrap_or("")
    }

    /// Advertising interval in 0.625 ms BLE units
    pub fn adv_interval_units(&self) -> u32 {
        u32::from(self.adv_interval_ms) * 8 / 5
    }
}
