//! Key-value storage primitive
//!
//! The configuration store persists values through the [`KvStore`] trait:
//! read/write/delete addressed by the same integer key space as the schema.
//!
//! # Backends
//!
//! - [`MemoryKvStore`]: heapless in-memory map (host tools, tests)
//! - [`FlashKvStore`]: append-only record log over a [`FlashInterface`] region
//!
//! [`FlashInterface`]: crate::platform::FlashInterface

pub mod crc;
pub mod flash_log;
pub mod memory;
pub mod record;

use crate::platform::{FlashError, PlatformError};
use core::fmt;

pub use flash_log::{FlashKvStore, FlashRegion, LogStats, CONFIG_REGION_BASE, CONFIG_REGION_SIZE};
pub use memory::MemoryKvStore;

/// Maximum number of distinct keys a store tracks
pub const MAX_KEYS: usize = 64;

/// Maximum stored value length in bytes
pub const MAX_VALUE_SIZE: usize = 64;

/// Errors reported by the storage primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No value stored for the key (never written, or deleted)
    NotFound,
    /// No room left for the value
    Full,
    /// Value longer than `MAX_VALUE_SIZE`
    TooLarge,
    /// Stored data failed integrity checks
    Corrupt,
    /// Stored length differs from the length the caller expects
    LengthMismatch {
        /// Length the caller asked for
        expected: u16,
        /// Length found in storage
        actual: u16,
    },
    /// Underlying Flash operation failed
    Flash(FlashError),
    /// Backend cannot serve requests right now
    Unavailable,
}

impl From<FlashError> for StoreError {
    fn from(err: FlashError) -> Self {
        StoreError::Flash(err)
    }
}

impl From<PlatformError> for StoreError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Flash(flash_err) => StoreError::Flash(flash_err),
            PlatformError::NotInitialized => StoreError::Unavailable,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Full => write!(f, "storage full"),
            StoreError::TooLarge => write!(f, "value too large"),
            StoreError::Corrupt => write!(f, "stored data corrupt"),
            StoreError::LengthMismatch { expected, actual } => {
                write!(f, "stored length {} (expected {})", actual, expected)
            }
            StoreError::Flash(e) => write!(f, "{}", e),
            StoreError::Unavailable => write!(f, "storage unavailable"),
        }
    }
}

/// Key-value persistence primitive
///
/// Implementations must make single-key writes atomic: a reader observes
/// either the previous value or the new one, never a mix.
pub trait KvStore {
    /// Read the value stored for `key` into `buf`.
    ///
    /// Copies `min(buf.len(), stored_len)` bytes and returns the stored
    /// length. Returns `StoreError::NotFound` when no value is stored.
    fn read(&mut self, key: u16, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// Store `data` for `key`, replacing any previous value.
    fn write(&mut self, key: u16, data: &[u8]) -> Result<(), StoreError>;

    /// Remove the value stored for `key`.
    ///
    /// Deleting a key that has no value succeeds.
    fn delete(&mut self, key: u16) -> Result<(), StoreError>;
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn read(&mut self, key: u16, buf: &mut [u8]) -> Result<usize, StoreError> {
        (**self).read(key, buf)
    }

    fn write(&mut self, key: u16, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, data)
    }

    fn delete(&mut self, key: u16) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}
