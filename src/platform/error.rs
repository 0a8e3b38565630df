//! Platform error types
//!
//! This module defines error types for platform operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Flash operation failed
    Flash(FlashError),
    /// Peripheral not initialized
    NotInitialized,
}

/// Flash-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Address outside the accessible range or misaligned
    InvalidAddress,
    /// Read operation failed
    ReadFailed,
    /// Write operation failed
    WriteFailed,
    /// Erase operation failed
    EraseFailed,
}

impl From<FlashError> for PlatformError {
    fn from(err: FlashError) -> Self {
        PlatformError::Flash(err)
    }
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashError::InvalidAddress => write!(f, "invalid flash address"),
            FlashError::ReadFailed => write!(f, "flash read failed"),
            FlashError::WriteFailed => write!(f, "flash write failed"),
            FlashError::EraseFailed => write!(f, "flash erase failed"),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "Flash error: {}", e),
            PlatformError::NotInitialized => write!(f, "Peripheral not initialized"),
        }
    }
}
