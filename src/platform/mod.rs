//! Platform abstraction layer
//!
//! This module provides the hardware abstraction consumed by the storage
//! backends. Only Flash is needed by the configuration store.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result};
pub use traits::FlashInterface;
