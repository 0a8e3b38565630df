//! Mock key-value store for testing

use crate::core::kv::{KvStore, MemoryKvStore, StoreError};

/// Mock key-value store with failure injection
///
/// Wraps a [`MemoryKvStore`] and counts every operation. Reads, writes and
/// deletes can be made to fail to exercise error paths of the layers above.
#[derive(Debug, Default)]
pub struct MockKvStore {
    inner: MemoryKvStore,
    fail_reads: bool,
    fail_writes: bool,
    fail_delete_key: Option<u16>,
    reads: u32,
    writes: u32,
    deletes: u32,
}

impl MockKvStore {
    /// Create a new, empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with `StoreError::Unavailable`
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every write fail with `StoreError::Full`
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make deletes of `key` fail (`None` clears the injection)
    pub fn fail_delete_of(&mut self, key: Option<u16>) {
        self.fail_delete_key = key;
    }

    /// Number of read calls
    pub fn read_count(&self) -> u32 {
        self.reads
    }

    /// Number of write calls, including failed ones
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Number of delete calls, including failed ones
    pub fn delete_count(&self) -> u32 {
        self.deletes
    }

    /// Raw stored bytes for `key` (for test verification)
    pub fn raw(&self, key: u16) -> Option<&[u8]> {
        self.inner.raw(key)
    }

    /// Store bytes directly, bypassing counters and failure injection
    pub fn preload(&mut self, key: u16, data: &[u8]) -> Result<(), StoreError> {
        self.inner.write(key, data)
    }

    /// True if a value is stored for `key`
    pub fn contains(&self, key: u16) -> bool {
        self.inner.contains(key)
    }
}

impl KvStore for MockKvStore {
    fn read(&mut self, key: u16, buf: &mut [u8]) -> Result<usize, StoreError> {
        self.reads += 1;
        if self.fail_reads {
            return Err(StoreError::Unavailable);
        }
        self.inner.read(key, buf)
    }

    fn write(&mut self, key: u16, data: &[u8]) -> Result<(), StoreError> {
        self.writes += 1;
        if self.fail_writes {
            return Err(StoreError::Full);
        }
        self.inner.write(key, data)
    }

    fn delete(&mut self, key: u16) -> Result<(), StoreError> {
        self.deletes += 1;
        if self.fail_delete_key == Some(key) {
            return Err(StoreError::Unavailable);
        }
        self.inner.delete(key)
    }
}
