//! Bulk reset operations
//!
//! Resets delete stored values so that keys fall back to their defaults.
//! They are best-effort: a failed delete is logged and recorded, and the
//! remaining keys are still processed.
//!
//! `reset_resettable` is the factory-reset path. It never touches keys
//! declared non-resettable (identity, calibration); only `reset_all` does.

use super::notify::ChangeSink;
use super::store::ConfigStore;
use crate::core::kv::{KvStore, StoreError, MAX_KEYS};
use heapless::Vec;

/// Delete failure for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetFailure {
    /// Key that could not be reset
    pub key: u16,
    /// Storage error returned by the delete
    pub error: StoreError,
}

/// Outcome of a bulk reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Keys whose stored value was deleted
    pub cleared: u16,
    /// Keys left untouched because they are not resettable
    pub skipped: u16,
    /// Keys whose delete failed
    pub failures: Vec<ResetFailure, MAX_KEYS>,
}

impl ResetReport {
    /// True if no delete failed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<S: KvStore, N: ChangeSink> ConfigStore<S, N> {
    /// Delete the stored value of every key
    ///
    /// Every key reverts to its default, including non-resettable ones.
    pub fn reset_all(&mut self) -> ResetReport {
        let mut report = ResetReport::default();
        for key in self.registry.keys() {
            self.reset_key(key, &mut report);
        }

        crate::log_info!(
            "Reset all config: {} cleared, {} failed",
            report.cleared,
            report.failures.len()
        );
        report
    }

    /// Delete the stored value of every resettable key
    pub fn reset_resettable(&mut self) -> ResetReport {
        let mut report = ResetReport::default();
        for key in self.registry.keys() {
            let resettable = self
                .registry
                .entry_for(key)
                .is_ok_and(|entry| entry.is_resettable());

            if resettable {
                self.reset_key(key, &mut report);
            } else {
                report.skipped += 1;
            }
        }

        crate::log_info!(
            "Reset resettable config: {} cleared, {} kept, {} failed",
            report.cleared,
            report.skipped,
            report.failures.len()
        );
        report
    }

    fn reset_key(&mut self, key: u16, report: &mut ResetReport) {
        match self.storage.delete(key) {
            Ok(()) => {
                crate::log_debug!("Reset {} to default", self.registry.name_of(key));
                report.cleared += 1;
            }
            Err(error) => {
                crate::log_error!(
                    "Failed to reset {} to default: {}",
                    self.registry.name_of(key),
                    error
                );
                // Capacity matches the key space, so this cannot overflow
                let _ = report.failures.push(ResetFailure { key, error });
            }
        }
    }
}
