//! In-memory key-value store
//!
//! Fixed-capacity map with the same semantics as the Flash backend. Used on
//! hosts without Flash and as the storage fake in tests.

use super::{KvStore, StoreError, MAX_KEYS, MAX_VALUE_SIZE};
use heapless::index_map::FnvIndexMap;
use heapless::Vec;

/// Heapless in-memory key-value store
///
/// # Example
///
/// ```
/// use nvconfig::core::kv::MemoryKvStore;
/// use nvconfig::{KvStore, StoreError};
///
/// let mut store = MemoryKvStore::new();
/// store.write(4, &[1, 2, 3, 4]).unwrap();
///
/// let mut buf = [0u8; 4];
/// assert_eq!(store.read(4, &mut buf), Ok(4));
/// assert_eq!(buf, [1, 2, 3, 4]);
///
/// store.delete(4).unwrap();
/// assert_eq!(store.read(4, &mut buf), Err(StoreError::NotFound));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: FnvIndexMap<u16, Vec<u8, MAX_VALUE_SIZE>, MAX_KEYS>,
}

impl MemoryKvStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
        }
    }

    /// True if a value is stored for `key`
    pub fn contains(&self, key: u16) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw stored bytes for `key` (for test verification)
    pub fn raw(&self, key: u16) -> Option<&[u8]> {
        self.entries.get(&key).map(|value| value.as_slice())
    }
}

impl KvStore for MemoryKvStore {
    fn read(&mut self, key: u16, buf: &mut [u8]) -> Result<usize, StoreError> {
        let value = self.entries.get(&key).ok_or(StoreError::NotFound)?;
        let n = value.len().min(buf.len());
        buf[..n].copy_from_slice(&value[..n]);
        Ok(value.len())
    }

    fn write(&mut self, key: u16, data: &[u8]) -> Result<(), StoreError> {
        let value = Vec::from_slice(data).map_err(|_| StoreError::TooLarge)?;
        self.entries
            .insert(key, value)
            .map_err(|_| StoreError::Full)?;
        Ok(())
    }

    fn delete(&mut self, key: u16) -> Result<(), StoreError> {
        self.entries.remove(&key);
        Ok(())
    }
}
