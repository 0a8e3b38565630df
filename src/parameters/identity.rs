//! Identity Parameter Group
//!
//! Factory data written once during production: serial number and
//! accelerometer calibration. These keys are not resettable, so a factory
//! reset (`reset_resettable`) keeps them. Only `reset_all` clears them.

use super::schema::{name_str, settings, AccelCalibration, NAME_LEN};
use crate::core::config::{ChangeSink, ConfigError, ConfigStore};
use crate::core::kv::KvStore;

/// Identity parameters loaded from the configuration store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityParams {
    /// Zero-padded serial number (all zero when unprovisioned)
    pub serial: [u8; NAME_LEN],
    /// Accelerometer calibration
    pub calibration: AccelCalibration,
}

impl IdentityParams {
    /// Load identity parameters
    pub fn from_store<S: KvStore, N: ChangeSink>(
        store: &mut ConfigStore<S, N>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            serial: store.read(settings::DEVICE_SERIAL)?,
            calibration: store.read(settings::ACCEL_CALIBRATION)?,
        })
    }

    /// Write factory data
    pub fn provision<S: KvStore, N: ChangeSink>(
        &self,
        store: &mut ConfigStore<S, N>,
    ) -> Result<(), ConfigError> {
        store.write(settings::DEVICE_SERIAL, &self.serial)?;
        store.write(settings::ACCEL_CALIBRATION, &self.calibration)?;
        crate::log_info!("Device provisioned");
        Ok(())
    }

    /// True once a serial number has been written
    pub fn is_provisioned(&self) -> bool {
        self.serial.iter().any(|b| *b != 0)
    }

    /// Serial number as text
    pub fn serial_str(&self) -> Option<&str> {
        name_str(&self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kv::MemoryKvStore;
    use crate::parameters::schema::padded_name;
    use crate::parameters::DeviceKey;

    fn store() -> ConfigStore<MemoryKvStore> {
        ConfigStore::new(DeviceKey::registry().unwrap(), MemoryKvStore::new(), ())
    }

    #[test]
    fn test_unprovisioned_defaults() {
        let identity = IdentityParams::from_store(&mut store()).unwrap();
        assert!(!identity.is_provisioned());
        assert_eq!(identity.calibration, AccelCalibration::IDENTITY);
        assert_eq!(identity.serial_str(), Some(""));
    }

    #[test]
    fn test_identity_survives_factory_reset() {
        let mut store = store();
        let identity = IdentityParams {
            serial: padded_name("SN-000123"),
            calibration: AccelCalibration {
                offset: [3, -4, 5],
                scale: [1001, 999, 1000],
            },
        };
        identity.provision(&mut store).unwrap();
        store.write(settings::LOG_LEVEL, &4).unwrap();

        store.reset_resettable();
        assert_eq!(IdentityParams::from_store(&mut store).unwrap(), identity);
        assert_eq!(store.read(settings::LOG_LEVEL), Ok(2));

        store.reset_all();
        assert!(!IdentityParams::from_store(&mut store)
            .unwrap()
            .is_provisioned());
    }

    #[test]
    fn test_zero_scale_calibration_rejected() {
        let mut store = store();
        let identity = IdentityParams {
            serial: padded_name("SN-1"),
            calibration: AccelCalibration {
                offset: [0; 3],
                scale: [1000, 0, 1000],
            },
        };

        assert_eq!(
            identity.provision(&mut store),
            Err(ConfigError::ValidationFailed(DeviceKey::ACCEL_CALIBRATION.id()))
        );
    }
}
