//! Device Parameters
//!
//! Build-time schema of every persisted device setting, plus typed parameter
//! groups that load related settings together.
//!
//! # Parameter Groups
//!
//! | Group            | Keys                                                  | Resettable |
//! |------------------|-------------------------------------------------------|------------|
//! | `IdentityParams` | `DEVICE_SERIAL`, `ACCEL_CALIBRATION`                  | no         |
//! | `SamplingParams` | `SAMPLE_RATE_MULT`, `SAMPLE_ENABLED`                  | yes        |
//! | `BleParams`      | `BLE_ADV_INTERVAL_MS`, `BLE_TX_POWER`, `BLE_DEVICE_NAME` | yes     |
//! | `SystemParams`   | `WDT_TIMEOUT_MS`, `LOG_LEVEL`                         | yes        |
//!
//! # Example
//!
//! ```
//! use nvconfig::core::kv::MemoryKvStore;
//! use nvconfig::parameters::{DeviceKey, SamplingParams};
//! use nvconfig::ConfigStore;
//!
//! let mut store = ConfigStore::new(DeviceKey::registry().unwrap(), MemoryKvStore::new(), ());
//! let sampling = SamplingParams::from_store(&mut store).unwrap();
//! assert_eq!(sampling.rate_mult, 1);
//! ```

pub mod bluetooth;
pub mod identity;
pub mod sampling;
pub mod schema;
pub mod system;

pub use bluetooth::BleParams;
pub use identity::IdentityParams;
pub use sampling::SamplingParams;
pub use schema::{settings, AccelCalibration, DeviceKey};
pub use system::SystemParams;
