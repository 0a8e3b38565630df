//! Sampling Parameter Group
//!
//! # Parameters
//!
//! - `SAMPLE_RATE_MULT` - Multiplier applied to the base sampling rate (non-zero)
//! - `SAMPLE_ENABLED` - Start sampling at boot
//!
//! Both are resettable. `SAMPLE_RATE_MULT` is live-tunable: a sampling task can
//! subscribe to change events and pick up new values without a reboot.

use super::schema::settings;
use crate::core::config::{ChangeEvent, ChangeSink, ConfigError, ConfigStore};
use crate::core::kv::KvStore;

/// Sampling parameters loaded from the configuration store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParams {
    /// Sampling rate multiplier
    pub rate_mult: u32,
    /// Sampling enabled at boot
    pub enabled: bool,
}

impl SamplingParams {
    /// Load sampling parameters (defaults for anything never written)
    pub fn from_store<S: KvStore, N: ChangeSink>(
        store: &mut ConfigStore<S, N>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            rate_mult: store.read(settings::SAMPLE_RATE_MULT)?,
            enabled: store.read(settings::SAMPLE_ENABLED)?,
        })
    }

    /// Persist every field
    ///
    /// Stops at the first rejected or failed write.
    pub fn save<S: KvStore, N: ChangeSink>(
        &self,
        store: &mut ConfigStore<S, N>,
    ) -> Result<(), ConfigError> {
        store.write(settings::SAMPLE_RATE_MULT, &self.rate_mult)?;
        store.write(settings::SAMPLE_ENABLED, &self.enabled)
    }

    /// Update from a change event; returns true if a field changed
    pub fn apply_event(&mut self, event: &ChangeEvent) -> bool {
        if let Some(rate_mult) = event.value_as(settings::SAMPLE_RATE_MULT) {
            self.rate_mult = rate_mult;
            return true;
        }
        if let Some(enabled) = event.value_as(settings::SAMPLE_ENABLED) {
            self.enabled = enabled;
            return true;
        }
        false
    }

    /// Effective sampling rate for a sensor base rate
    pub fn effective_rate_hz(&self, base_hz: u32) -> u32 {
        base_hz.saturating_mul(self.rate_mult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kv::MemoryKvStore;
    use crate::parameters::DeviceKey;

    fn store() -> ConfigStore<MemoryKvStore> {
        ConfigStore::new(DeviceKey::registry().unwrap(), MemoryKvStore::new(), ())
    }

    #[test]
    fn test_sampling_defaults() {
        let params = SamplingParams::from_store(&mut store()).unwrap();
        assert_eq!(
            params,
            SamplingParams {
                rate_mult: 1,
                enabled: true
            }
        );
        assert_eq!(params.effective_rate_hz(100), 100);
    }

    #[test]
    fn test_sampling_save_and_reload() {
        let mut store = store();
        let params = SamplingParams {
            rate_mult: 4,
            enabled: false,
        };
        params.save(&mut store).unwrap();

        assert_eq!(SamplingParams::from_store(&mut store).unwrap(), params);
        assert_eq!(params.effective_rate_hz(100), 400);
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let mut store = store();
        let params = SamplingParams {
            rate_mult: 0,
            enabled: false,
        };

        assert_eq!(
            params.save(&mut store),
            Err(ConfigError::ValidationFailed(DeviceKey::SAMPLE_RATE_MULT.id()))
        );
        // Nothing after the rejected field was written
        assert!(SamplingParams::from_store(&mut store).unwrap().enabled);
    }

    #[test]
    fn test_apply_event() {
        let mut params = SamplingParams {
            rate_mult: 1,
            enabled: true,
        };

        let event = ChangeEvent::new(DeviceKey::SAMPLE_RATE_MULT.id(), &8u32.to_le_bytes()).unwrap();
        assert!(params.apply_event(&event));
        assert_eq!(params.rate_mult, 8);

        let unrelated = ChangeEvent::new(DeviceKey::LOG_LEVEL.id(), &[3]).unwrap();
        assert!(!params.apply_event(&unrelated));
    }
}
