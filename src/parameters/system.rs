//! System Parameter Group
//!
//! # Parameters
//!
//! - `WDT_TIMEOUT_MS` - Watchdog timeout (non-zero, default from `NVCONFIG_WDT_TIMEOUT_MS`)
//! - `LOG_LEVEL` - Runtime log level (0 = error .. 4 = trace)
//!
//! # Log Level Recovery
//!
//! An unreadable or out-of-range stored `LOG_LEVEL` is replaced by
//! `DEFAULT_LOG_LEVEL` and written back. Levels quieter than
//! `MIN_RUNTIME_LOG_LEVEL` are raised to it, both at load and on set, and the
//! raised value is persisted.

use super::schema::{settings, DEFAULT_LOG_LEVEL, MAX_LOG_LEVEL, MIN_RUNTIME_LOG_LEVEL};
use crate::core::config::{ChangeSink, ConfigError, ConfigStore};
use crate::core::kv::KvStore;

/// System parameters loaded from the configuration store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemParams {
    /// Watchdog timeout (ms)
    pub wdt_timeout_ms: u32,
    /// Runtime log level
    pub log_level: u8,
}

impl SystemParams {
    /// Load system parameters (defaults for anything never written)
    ///
    /// The log level goes through [`Self::load_log_level`].
    pub fn from_store<S: KvStore, N: ChangeSink>(
        store: &mut ConfigStore<S, N>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            wdt_timeout_ms: store.read(settings::WDT_TIMEOUT_MS)?,
            log_level: Self::load_log_level(store),
        })
    }

    /// Load the runtime log level, repairing the stored value if needed
    ///
    /// Never fails: storage errors fall back to `DEFAULT_LOG_LEVEL`. Failures
    /// to write the repaired value back are logged.
    pub fn load_log_level<S: KvStore, N: ChangeSink>(store: &mut ConfigStore<S, N>) -> u8 {
        let mut level = match store.read(settings::LOG_LEVEL) {
            Ok(level) if level <= MAX_LOG_LEVEL => level,
            Ok(level) => {
                crate::log_warn!("Stored log level {} is invalid, using default", level);
                Self::persist_log_level(store, DEFAULT_LOG_LEVEL);
                DEFAULT_LOG_LEVEL
            }
            Err(e) => {
                crate::log_warn!("Log level unreadable ({}), using default", e);
                Self::persist_log_level(store, DEFAULT_LOG_LEVEL);
                DEFAULT_LOG_LEVEL
            }
        };

        if level < MIN_RUNTIME_LOG_LEVEL {
            crate::log_warn!(
                "Stored log level is below minimum, clamping to {}",
                MIN_RUNTIME_LOG_LEVEL
            );
            level = MIN_RUNTIME_LOG_LEVEL;
            Self::persist_log_level(store, level);
        }

        crate::log_info!("Log level initialized: {}", level);
        level
    }

    /// Persist a new runtime log level, raised to `MIN_RUNTIME_LOG_LEVEL`
    ///
    /// Returns the level actually stored.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `level` exceeds `MAX_LOG_LEVEL`
    /// - `StorageWriteFailed` if the value cannot be persisted
    pub fn set_log_level<S: KvStore, N: ChangeSink>(
        store: &mut ConfigStore<S, N>,
        level: u8,
    ) -> Result<u8, ConfigError> {
        if level > MAX_LOG_LEVEL {
            crate::log_error!("Invalid log level {}, valid levels are 0..{}", level, MAX_LOG_LEVEL);
            return Err(ConfigError::ValidationFailed(settings::LOG_LEVEL.key()));
        }

        let clamped = level.max(MIN_RUNTIME_LOG_LEVEL);
        store.write(settings::LOG_LEVEL, &clamped)?;

        if clamped != level {
            crate::log_warn!(
                "Requested log level {} clamped to minimum {}",
                level,
                clamped
            );
        }
        crate::log_info!("Log level set to {}", clamped);
        Ok(clamped)
    }

    fn persist_log_level<S: KvStore, N: ChangeSink>(store: &mut ConfigStore<S, N>, level: u8) {
        if let Err(e) = store.write(settings::LOG_LEVEL, &level) {
            crate::log_error!("Failed to save log level: {}", e);
        }
    }

    /// Interval at which the watchdog should be fed (half the timeout)
    pub fn feed_interval_ms(&self) -> u32 {
        (self.wdt_timeout_ms / 2).max(1)
    }
}
