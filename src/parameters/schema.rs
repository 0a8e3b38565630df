//! Device configuration schema
//!
//! Single declaration of every persisted device setting. Key ids are assigned
//! in declaration order and are stored on Flash, so new keys must be appended
//! at the end.

use crate::config_schema;
use crate::core::config::ConfigValue;

/// Length of the fixed-size name and serial settings
pub const NAME_LEN: usize = 16;

/// Build-time default for the advertised BLE name
pub const DEFAULT_BLE_DEVICE_NAME: &str = env!("NVCONFIG_BLE_DEVICE_NAME");

/// Build-time default watchdog timeout in milliseconds
pub const DEFAULT_WDT_TIMEOUT_MS: u32 = parse_decimal(env!("NVCONFIG_WDT_TIMEOUT_MS"));

/// Most verbose accepted `LOG_LEVEL` (0 = error .. 4 = trace)
pub const MAX_LOG_LEVEL: u8 = 4;

/// Quietest level the runtime is allowed to run at (1 = warn)
pub const MIN_RUNTIME_LOG_LEVEL: u8 = 1;

/// `LOG_LEVEL` used when nothing usable is stored (2 = info)
pub const DEFAULT_LOG_LEVEL: u8 = 2;

/// Accepted BLE advertising interval range in milliseconds
pub const BLE_ADV_INTERVAL_RANGE_MS: core::ops::RangeInclusive<u16> = 20..=10240;

/// Accepted BLE transmit power range in dBm
pub const BLE_TX_POWER_RANGE_DBM: core::ops::RangeInclusive<i8> = -40..=8;

const fn parse_decimal(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

/// Zero-padded fixed-size copy of `name`, truncated to `NAME_LEN` bytes
pub fn padded_name(name: &str) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    let len = name.len().min(NAME_LEN);
    out[..len].copy_from_slice(&name.as_bytes()[..len]);
    out
}

/// Text of a zero-padded name setting, if it is valid UTF-8
pub fn name_str(raw: &[u8; NAME_LEN]) -> Option<&str> {
    let len = raw.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
    core::str::from_utf8(&raw[..len]).ok()
}

/// Accelerometer calibration
///
/// Per-axis offset in raw counts and scale in parts per thousand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelCalibration {
    /// X/Y/Z offset (raw counts)
    pub offset: [i16; 3],
    /// X/Y/Z scale (1000 = unity)
    pub scale: [u16; 3],
}

impl AccelCalibration {
    /// Identity calibration (no offset, unity scale)
    pub const IDENTITY: Self = Self {
        offset: [0; 3],
        scale: [1000; 3],
    };

    /// Apply the calibration to a raw sample
    pub fn apply(&self, raw: [i16; 3]) -> [i32; 3] {
        let mut out = [0i32; 3];
        for axis in 0..3 {
            let centered = i32::from(raw[axis]) - i32::from(self.offset[axis]);
            out[axis] = centered * i32::from(self.scale[axis]) / 1000;
        }
        out
    }
}

impl Default for AccelCalibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ConfigValue for AccelCalibration {
    const SIZE: usize = 12;

    fn encode(&self, out: &mut [u8]) {
        let mut raw = [0u8; Self::SIZE];
        for axis in 0..3 {
            raw[axis * 2..axis * 2 + 2].copy_from_slice(&self.offset[axis].to_le_bytes());
            raw[6 + axis * 2..6 + axis * 2 + 2].copy_from_slice(&self.scale[axis].to_le_bytes());
        }
        <[u8; 12]>::encode(&raw, out);
    }

    fn decode(bytes: &[u8]) -> Self {
        let raw = <[u8; 12]>::decode(bytes);
        let mut calibration = Self {
            offset: [0; 3],
            scale: [0; 3],
        };
        for axis in 0..3 {
            calibration.offset[axis] = i16::from_le_bytes([raw[axis * 2], raw[axis * 2 + 1]]);
            calibration.scale[axis] =
                u16::from_le_bytes([raw[6 + axis * 2], raw[6 + axis * 2 + 1]]);
        }
        calibration
    }
}

fn nonzero(value: &u32) -> bool {
    *value != 0
}

fn valid_scale(value: &AccelCalibration) -> bool {
    value.scale.iter().all(|scale| *scale != 0)
}

fn valid_adv_interval(value: &u16) -> bool {
    BLE_ADV_INTERVAL_RANGE_MS.contains(value)
}

fn valid_tx_power(value: &i8) -> bool {
    BLE_TX_POWER_RANGE_DBM.contains(value)
}

fn valid_device_name(value: &[u8; NAME_LEN]) -> bool {
    value[0] != 0 && name_str(value).is_some()
}

fn valid_log_level(value: &u8) -> bool {
    *value <= MAX_LOG_LEVEL
}

config_schema! {
    /// Device configuration keys
    pub enum DeviceKey in settings {
        /// Factory-programmed serial number
        DEVICE_SERIAL: [u8; NAME_LEN] = [0; NAME_LEN], resettable: false;
        /// Accelerometer calibration from production test
        ACCEL_CALIBRATION: AccelCalibration = AccelCalibration::IDENTITY, resettable: false,
            validate: valid_scale;
        /// Sampling rate multiplier (must be non-zero)
        SAMPLE_RATE_MULT: u32 = 1, resettable: true, validate: nonzero;
        /// Sampling enabled at boot
        SAMPLE_ENABLED: bool = true, resettable: true;
        /// BLE advertising interval (ms)
        BLE_ADV_INTERVAL_MS: u16 = 100, resettable: true, validate: valid_adv_interval;
        /// BLE transmit power (dBm)
        BLE_TX_POWER: i8 = 0, resettable: true, validate: valid_tx_power;
        /// Advertised BLE device name (zero-padded)
        BLE_DEVICE_NAME: [u8; NAME_LEN] = padded_name(DEFAULT_BLE_DEVICE_NAME), resettable: true,
            validate: valid_device_name;
        /// Watchdog timeout (ms, must be non-zero)
        WDT_TIMEOUT_MS: u32 = DEFAULT_WDT_TIMEOUT_MS, resettable: true, validate: nonzero;
        /// Runtime log level (0 = error .. 4 = trace)
        LOG_LEVEL: u8 = DEFAULT_LOG_LEVEL, resettable: true, validate: valid_log_level;
    }
}
