//! Configuration error types

use crate::core::kv::StoreError;
use core::fmt;

/// Errors returned by configuration accessors
///
/// A failed operation never corrupts prior state: a rejected or failed write
/// leaves the previously stored value (or the default) in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Caller buffer size does not match the schema value size
    InvalidArgument {
        /// Key being accessed
        key: u16,
        /// Size declared in the schema
        expected: usize,
        /// Size supplied by the caller
        actual: usize,
    },
    /// Key outside the schema range
    KeyNotFound(u16),
    /// Value rejected by the key's validator
    ValidationFailed(u16),
    /// Storage primitive failed to read the value
    StorageReadFailed(StoreError),
    /// Storage primitive failed to persist the value
    StorageWriteFailed(StoreError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidArgument {
                key,
                expected,
                actual,
            } => write!(
                f,
                "buffer size for key {} incorrect: expected {}, got {}",
                key, expected, actual
            ),
            ConfigError::KeyNotFound(key) => write!(f, "unknown config key {}", key),
            ConfigError::ValidationFailed(key) => {
                write!(f, "value rejected for config key {}", key)
            }
            ConfigError::StorageReadFailed(e) => write!(f, "storage read failed: {}", e),
            ConfigError::StorageWriteFailed(e) => write!(f, "storage write failed: {}", e),
        }
    }
}

/// Errors raised while building a schema registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchemaError {
    /// More declarations than `MAX_KEYS`
    TooManyKeys,
    /// Declared value size is zero
    ZeroSize {
        /// Offending key
        key: u16,
    },
    /// Declared value size exceeds `MAX_VALUE_SIZE`
    ValueTooLarge {
        /// Offending key
        key: u16,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::TooManyKeys => write!(f, "too many config keys"),
            SchemaError::ZeroSize { key } => write!(f, "config key {} has zero size", key),
            SchemaError::ValueTooLarge { key } => {
                write!(f, "config key {} value too large", key)
            }
        }
    }
}

/// Result type for configuration operations
pub type Result<T> = core::result::Result<T, ConfigError>;
