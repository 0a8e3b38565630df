//! Diagnostic listing of every configuration value
//!
//! Renders one line per key for a console or log dump:
//!
//! ```text
//! SAMPLE_RATE_MULT: 1
//! DEVICE_SERIAL: <complex type, 16 bytes>
//! LOG_LEVEL: <error reading>
//! ```
//!
//! Values of 1, 2 or 4 bytes are shown as unsigned integers; anything else is
//! summarized by its size.

use super::notify::ChangeSink;
use super::store::ConfigStore;
use crate::core::kv::{KvStore, MAX_KEYS, MAX_VALUE_SIZE};
use core::fmt;
use heapless::Vec;

/// Rendered value of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ListedValue {
    /// 1, 2 or 4-byte value shown as an unsigned integer
    Unsigned(u32),
    /// Any other size
    Complex {
        /// Value size in bytes
        size: usize,
    },
    /// The value could not be read
    ReadError,
}

/// One line of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ListedEntry {
    /// Key id
    pub key: u16,
    /// Human-readable name
    pub name: &'static str,
    /// Rendered value
    pub value: ListedValue,
}

impl fmt::Display for ListedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            ListedValue::Unsigned(value) => write!(f, "{}: {}", self.name, value),
            ListedValue::Complex { size } => {
                write!(f, "{}: <complex type, {} bytes>", self.name, size)
            }
            ListedValue::ReadError => write!(f, "{}: <error reading>", self.name),
        }
    }
}

impl<S: KvStore, N: ChangeSink> ConfigStore<S, N> {
    /// List every key with its effective value
    pub fn list(&mut self) -> Vec<ListedEntry, MAX_KEYS> {
        let mut listing = Vec::new();

        for key in self.registry.keys() {
            let (name, size) = match self.registry.entry_for(key) {
                Ok(entry) => (entry.name(), entry.value_size()),
                Err(_) => continue,
            };

            let value = match size {
                1 | 2 | 4 => {
                    let mut raw = [0u8; MAX_VALUE_SIZE];
                    match self.get(key, &mut raw[..size]) {
                        Ok(()) => {
                            let mut word = [0u8; 4];
                            word[..size].copy_from_slice(&raw[..size]);
                            ListedValue::Unsigned(u32::from_le_bytes(word))
                        }
                        Err(_) => ListedValue::ReadError,
                    }
                }
                _ => ListedValue::Complex { size },
            };

            // Capacity matches the key space
            let _ = listing.push(ListedEntry { key, name, value });
        }

        listing
    }
}
