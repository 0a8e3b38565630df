//! Configuration store
//!
//! [`ConfigStore`] ties the schema registry, the storage primitive and the
//! change sink together. Stored values are only ever explicitly written ones;
//! a key with nothing stored reads as its schema default.
//!
//! # Size contract
//!
//! Raw accessors check the caller buffer against the schema value size and
//! return `ConfigError::InvalidArgument` on mismatch, for both reads and
//! writes. Typed accessors ([`ConfigStore::read`], [`ConfigStore::write`]) go
//! through [`Setting`] handles whose type fixes the size.

use super::error::{ConfigError, Result};
use super::notify::{ChangeEvent, ChangeSink};
use super::schema::{SchemaEntry, SchemaRegistry};
use super::value::{ConfigValue, Setting};
use crate::core::kv::{KvStore, StoreError, MAX_VALUE_SIZE};
use crate::core::traits::BlockingState;

/// Typed, validated, change-notified configuration store
///
/// # Example
///
/// ```
/// use nvconfig::core::kv::MemoryKvStore;
/// use nvconfig::parameters::{settings, DeviceKey};
/// use nvconfig::{ConfigError, ConfigStore};
///
/// let registry = DeviceKey::registry().unwrap();
/// let mut store = ConfigStore::new(registry, MemoryKvStore::new(), ());
///
/// assert_eq!(store.read(settings::SAMPLE_RATE_MULT), Ok(1));
/// assert_eq!(
///     store.write(settings::SAMPLE_RATE_MULT, &0),
///     Err(ConfigError::ValidationFailed(DeviceKey::SAMPLE_RATE_MULT.id()))
/// );
/// store.write(settings::SAMPLE_RATE_MULT, &5).unwrap();
/// assert_eq!(store.read(settings::SAMPLE_RATE_MULT), Ok(5));
/// ```
pub struct ConfigStore<S: KvStore, N: ChangeSink = ()> {
    pub(super) registry: SchemaRegistry,
    pub(super) storage: S,
    pub(super) sink: N,
}

/// Configuration store behind a blocking mutex, for sharing between tasks
pub type SharedConfigStore<M, S, N = ()> = BlockingState<M, ConfigStore<S, N>>;

fn check_size(key: u16, entry: &SchemaEntry, actual: usize) -> Result<()> {
    let expected = entry.value_size();
    if expected != actual {
        crate::log_error!(
            "Size of buffer for {} incorrect. Expected {} but got {}",
            entry.name(),
            expected,
            actual
        );
        return Err(ConfigError::InvalidArgument {
            key,
            expected,
            actual,
        });
    }
    Ok(())
}

impl<S: KvStore, N: ChangeSink> ConfigStore<S, N> {
    /// Create a store over `storage`, publishing changes to `sink`
    pub fn new(registry: SchemaRegistry, storage: S, sink: N) -> Self {
        crate::log_info!("Config store ready with {} keys", registry.len());
        Self {
            registry,
            storage,
            sink,
        }
    }

    /// Read the effective value of `key` into `dst`
    ///
    /// Copies the schema default when nothing is stored. On error `dst` is
    /// left unmodified.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if `key` is outside the schema
    /// - `InvalidArgument` if `dst.len()` differs from the value size
    /// - `StorageReadFailed` if the storage read fails or returns a value of
    ///   the wrong length (`StoreError::LengthMismatch`)
    pub fn get(&mut self, key: u16, dst: &mut [u8]) -> Result<()> {
        let entry = self.registry.entry_for(key)?;
        check_size(key, entry, dst.len())?;
        let size = entry.value_size();

        let mut raw = [0u8; MAX_VALUE_SIZE];
        match self.storage.read(key, &mut raw) {
            Ok(stored) if stored == size => {
                dst.copy_from_slice(&raw[..size]);
                Ok(())
            }
            Ok(stored) => {
                crate::log_error!(
                    "Stored value for {} has {} bytes, expected {}",
                    entry.name(),
                    stored,
                    size
                );
                Err(ConfigError::StorageReadFailed(StoreError::LengthMismatch {
                    expected: size as u16,
                    actual: stored.min(u16::MAX as usize) as u16,
                }))
            }
            Err(StoreError::NotFound) => {
                dst.copy_from_slice(entry.default_value());
                Ok(())
            }
            Err(e) => {
                crate::log_error!("Failed to read config for key {}: {}", entry.name(), e);
                Err(ConfigError::StorageReadFailed(e))
            }
        }
    }

    /// Validate, persist and announce a new value for `key`
    ///
    /// A change event is published only after the value is stored. Sink
    /// failures are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// - `KeyNotFound` if `key` is outside the schema
    /// - `InvalidArgument` if `src.len()` differs from the value size
    /// - `ValidationFailed` if the key's validator rejects `src`
    /// - `StorageWriteFailed` if the storage write fails
    pub fn set(&mut self, key: u16, src: &[u8]) -> Result<()> {
        let entry = self.registry.entry_for(key)?;
        check_size(key, entry, src.len())?;

        if !entry.validate(src) {
            crate::log_warn!("Rejected invalid value for {}", entry.name());
            return Err(ConfigError::ValidationFailed(key));
        }

        if let Err(e) = self.storage.write(key, src) {
            crate::log_error!("Failed to write config value for key {}: {}", entry.name(), e);
            return Err(ConfigError::StorageWriteFailed(e));
        }

        let published = ChangeEvent::new(key, src).and_then(|event| self.sink.publish(&event));
        if let Err(e) = published {
            crate::log_warn!("Change event for {} dropped: {}", entry.name(), e);
        }

        Ok(())
    }

    /// Read the effective value behind a typed handle
    pub fn read<T: ConfigValue>(&mut self, setting: Setting<T>) -> Result<T> {
        let size = self.typed_size::<T>(setting.key())?;
        let mut raw = [0u8; MAX_VALUE_SIZE];
        self.get(setting.key(), &mut raw[..size])?;
        Ok(T::decode(&raw[..size]))
    }

    /// Validate, persist and announce a typed value
    pub fn write<T: ConfigValue>(&mut self, setting: Setting<T>, value: &T) -> Result<()> {
        let size = self.typed_size::<T>(setting.key())?;
        let mut raw = [0u8; MAX_VALUE_SIZE];
        value.encode(&mut raw[..size]);
        self.set(setting.key(), &raw[..size])
    }

    fn typed_size<T: ConfigValue>(&self, key: u16) -> Result<usize> {
        let entry = self.registry.entry_for(key)?;
        check_size(key, entry, T::SIZE)?;
        Ok(T::SIZE)
    }

    /// Human-readable name of `key`, or `"Unknown key"`
    pub fn name_of(&self, key: u16) -> &'static str {
        self.registry.name_of(key)
    }

    /// Schema registry
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Storage primitive
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable storage primitive (bypasses validation and notification)
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Change sink
    pub fn sink(&self) -> &N {
        &self.sink
    }

    /// Mutable change sink
    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    /// Take the store apart
    pub fn into_parts(self) -> (SchemaRegistry, S, N) {
        (self.registry, self.storage, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::notify::RecordingSink;
    use crate::core::traits::SharedState;
    use crate::platform::mock::MockKvStore;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    fn nonzero(value: &u32) -> bool {
        *value != 0
    }

    crate::config_schema! {
        pub enum Key in keys {
            SERIAL: [u8; 4] = *b"SN00", resettable: false;
            SAMPLE_RATE_MULT: u32 = 1, resettable: true, validate: nonzero;
            ENABLED: bool = false, resettable: true;
        }
    }

    const MULT: u16 = Key::SAMPLE_RATE_MULT as u16;

    fn store() -> ConfigStore<MockKvStore, RecordingSink> {
        ConfigStore::new(
            Key::registry().unwrap(),
            MockKvStore::new(),
            RecordingSink::default(),
        )
    }

    #[test]
    fn test_defaults_before_any_write() {
        let mut store = store();

        let mut serial = [0u8; 4];
        store.get(Key::SERIAL.id(), &mut serial).unwrap();
        assert_eq!(&serial, b"SN00");
        assert_eq!(store.read(keys::SAMPLE_RATE_MULT), Ok(1));
        assert_eq!(store.read(keys::ENABLED), Ok(false));
        // Defaults are never written back
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_round_trip() {
        let mut store = store();
        store.set(Key::SERIAL.id(), b"AB12").unwrap();
        store.write(keys::ENABLED, &true).unwrap();

        let mut serial = [0u8; 4];
        store.get(Key::SERIAL.id(), &mut serial).unwrap();
        assert_eq!(&serial, b"AB12");
        assert_eq!(store.read(keys::ENABLED), Ok(true));
    }

    #[test]
    fn test_sample_rate_mult_scenario() {
        let mut store = store();

        assert_eq!(
            store.set(MULT, &0u32.to_le_bytes()),
            Err(ConfigError::ValidationFailed(MULT))
        );
        assert_eq!(store.read(keys::SAMPLE_RATE_MULT), Ok(1));

        store.set(MULT, &5u32.to_le_bytes()).unwrap();
        assert_eq!(store.read(keys::SAMPLE_RATE_MULT), Ok(5));

        store.reset_resettable();
        assert_eq!(store.read(keys::SAMPLE_RATE_MULT), Ok(1));
    }

    #[test]
    fn test_validation_failure_keeps_previous_value() {
        let mut store = store();
        store.write(keys::SAMPLE_RATE_MULT, &7).unwrap();

        assert!(store.write(keys::SAMPLE_RATE_MULT, &0).is_err());
        assert_eq!(store.read(keys::SAMPLE_RATE_MULT), Ok(7));
        assert_eq!(store.storage().write_count(), 1);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let mut store = store();

        let mut short = [0xAAu8; 2];
        assert_eq!(
            store.get(MULT, &mut short),
            Err(ConfigError::InvalidArgument {
                key: MULT,
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(short, [0xAA, 0xAA]);

        assert_eq!(
            store.set(MULT, &[1, 0, 0, 0, 0]),
            Err(ConfigError::InvalidArgument {
                key: MULT,
                expected: 4,
                actual: 5
            })
        );
        assert_eq!(store.storage().write_count(), 0);
        assert!(store.sink().events.is_empty());
    }

    #[test]
    fn test_typed_handle_size_mismatch() {
        let mut store = store();
        let wrong: Setting<u16> = Setting::new(MULT);

        assert!(matches!(
            store.read(wrong),
            Err(ConfigError::InvalidArgument { expected: 4, actual: 2, .. })
        ));
        assert!(matches!(
            store.write(wrong, &3),
            Err(ConfigError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_unknown_key() {
        let mut store = store();
        let mut buf = [0u8; 4];

        assert_eq!(store.get(42, &mut buf), Err(ConfigError::KeyNotFound(42)));
        assert_eq!(store.set(42, &buf), Err(ConfigError::KeyNotFound(42)));
        assert_eq!(store.name_of(42), "Unknown key");
        assert_eq!(store.name_of(MULT), "SAMPLE_RATE_MULT");
    }

    #[test]
    fn test_successful_set_emits_one_event() {
        let mut store = store();
        store.write(keys::SAMPLE_RATE_MULT, &5).unwrap();

        let events = &store.sink().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key(), MULT);
        assert_eq!(events[0].value(), &5u32.to_le_bytes());
        assert_eq!(events[0].value_as(keys::SAMPLE_RATE_MULT), Some(5));
    }

    #[test]
    fn test_failed_set_emits_nothing() {
        let mut store = store();
        assert!(store.write(keys::SAMPLE_RATE_MULT, &0).is_err());

        store.storage_mut().fail_writes(true);
        assert_eq!(
            store.write(keys::SAMPLE_RATE_MULT, &3),
            Err(ConfigError::StorageWriteFailed(StoreError::Full))
        );
        assert!(store.sink().events.is_empty());
    }

    #[test]
    fn test_sink_failure_is_not_fatal() {
        let mut store = store();
        store.sink_mut().fail = true;

        assert!(store.write(keys::SAMPLE_RATE_MULT, &9).is_ok());
        assert_eq!(store.read(keys::SAMPLE_RATE_MULT), Ok(9));
    }

    #[test]
    fn test_storage_read_failure() {
        let mut store = store();
        store.storage_mut().fail_reads(true);

        assert_eq!(
            store.read(keys::SAMPLE_RATE_MULT),
            Err(ConfigError::StorageReadFailed(StoreError::Unavailable))
        );
    }

    #[test]
    fn test_stored_length_mismatch_leaves_buffer() {
        let mut store = store();
        store.storage_mut().preload(MULT, &[1, 2]).unwrap();

        let mut buf = [0xEEu8; 4];
        assert_eq!(
            store.get(MULT, &mut buf),
            Err(ConfigError::StorageReadFailed(StoreError::LengthMismatch {
                expected: 4,
                actual: 2
            }))
        );
        assert_eq!(buf, [0xEE; 4]);
    }

    #[test]
    fn test_shared_store() {
        let shared: SharedConfigStore<CriticalSectionRawMutex, MockKvStore> =
            BlockingState::new(ConfigStore::new(
                Key::registry().unwrap(),
                MockKvStore::new(),
                (),
            ));

        shared
            .with_mut(|store| store.write(keys::SAMPLE_RATE_MULT, &4))
            .unwrap();
        let value = shared.with_mut(|store| store.read(keys::SAMPLE_RATE_MULT));
        assert_eq!(value, Ok(4));
        assert_eq!(shared.with(|store| store.name_of(0)), "SERIAL");
    }
}
