//! Flash-backed configuration log
//!
//! This module provides an append-only record log inside a dedicated Flash
//! region. Every write and delete appends one CRC-protected record; the latest
//! valid record for a key wins. An in-RAM index maps keys to their latest
//! record and is rebuilt by scanning the region at mount.
//!
//! # Power Loss
//!
//! A record is programmed with a single Flash write. If power is lost midway,
//! the torn record fails its CRC check at the next mount and is skipped, so
//! readers observe the previous value. After a torn header the scan steps
//! forward one word at a time until it finds the next valid header.
//!
//! A slot whose program failed outright stays erased while later records are
//! appended behind it. The scan only stops at an erased header once the rest
//! of the region is erased too.
//!
//! # Limits
//!
//! There is no compaction. Once the region is exhausted, writes fail with
//! [`StoreError::Full`] until the region is formatted.

use super::crc::checksum_parts;
use super::record::{is_erased, RecordHeader, CRC_SIZE, ERASED_BYTE};
use super::{KvStore, StoreError, MAX_KEYS, MAX_VALUE_SIZE};
use crate::platform::{FlashError, FlashInterface};
use heapless::index_map::FnvIndexMap;

/// Default configuration region base address (Flash offset)
pub const CONFIG_REGION_BASE: u32 = 0x040000; // 256 KB

/// Default configuration region size (8 blocks of 4 KB)
pub const CONFIG_REGION_SIZE: u32 = 0x8000;

/// Largest record the log can hold
const MAX_RECORD_SIZE: usize = RecordHeader::SIZE + MAX_VALUE_SIZE + CRC_SIZE;

/// Record start alignment in bytes
const RECORD_ALIGN: usize = 4;

/// Flash region reserved for the configuration log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashRegion {
    /// Absolute Flash address of the region start (block-aligned)
    pub base: u32,
    /// Region size in bytes (multiple of the block size)
    pub size: u32,
}

impl FlashRegion {
    /// Create a region descriptor
    pub const fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }

    fn is_compatible<F: FlashInterface>(&self, flash: &F) -> bool {
        let block = flash.block_size();
        self.size > 0
            && self.base.is_multiple_of(block)
            && self.size.is_multiple_of(block)
            && self
                .base
                .checked_add(self.size)
                .is_some_and(|end| end <= flash.capacity())
    }
}

impl Default for FlashRegion {
    fn default() -> Self {
        Self::new(CONFIG_REGION_BASE, CONFIG_REGION_SIZE)
    }
}

/// Location of the latest value record for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordLocation {
    /// Record offset relative to the region base
    offset: u32,
    /// Payload length
    len: u16,
}

/// Log usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogStats {
    /// Valid records found at mount plus records appended since
    pub records: u32,
    /// Records skipped because of a CRC mismatch or a damaged header
    pub skipped: u32,
    /// Bytes consumed by the log
    pub used_bytes: u32,
    /// Bytes left before the region is exhausted
    pub free_bytes: u32,
    /// Keys that currently hold a value
    pub live_keys: u16,
}

/// Append-only key-value log on Flash
///
/// # Example
///
/// ```ignore
/// use nvconfig::core::kv::{FlashKvStore, FlashRegion};
/// use nvconfig::platform::mock::MockFlash;
/// use nvconfig::KvStore;
///
/// let mut store = FlashKvStore::mount(MockFlash::new(), FlashRegion::default()).unwrap();
/// store.write(2, &5u32.to_le_bytes()).unwrap();
///
/// // Remount the same Flash: the value survives
/// let flash = store.into_inner();
/// let mut store = FlashKvStore::mount(flash, FlashRegion::default()).unwrap();
/// let mut buf = [0u8; 4];
/// assert_eq!(store.read(2, &mut buf), Ok(4));
/// ```
pub struct FlashKvStore<F: FlashInterface> {
    flash: F,
    region: FlashRegion,
    index: FnvIndexMap<u16, RecordLocation, MAX_KEYS>,
    /// Next append position, relative to the region base
    write_offset: u32,
    records: u32,
    skipped: u32,
}

impl<F: FlashInterface> FlashKvStore<F> {
    /// Mount the log stored in `region`, rebuilding the key index.
    ///
    /// An erased region mounts as an empty store.
    ///
    /// # Errors
    ///
    /// - `StoreError::Flash(FlashError::InvalidAddress)` if the region is
    ///   misaligned or exceeds the Flash capacity
    /// - `StoreError::Flash(_)` if a Flash read fails
    /// - `StoreError::Full` if the log holds more distinct keys than `MAX_KEYS`
    pub fn mount(flash: F, region: FlashRegion) -> Result<Self, StoreError> {
        if !region.is_compatible(&flash) {
            crate::log_error!(
                "Config region 0x{:x}+0x{:x} does not fit Flash geometry",
                region.base,
                region.size
            );
            return Err(FlashError::InvalidAddress.into());
        }

        let mut store = Self {
            flash,
            region,
            index: FnvIndexMap::new(),
            write_offset: 0,
            records: 0,
            skipped: 0,
        };
        store.scan()?;

        crate::log_info!(
            "Config log mounted: {} keys, {} bytes used",
            store.index.len(),
            store.write_offset
        );

        Ok(store)
    }

    /// Erase the whole region, dropping every stored value
    pub fn format(&mut self) -> Result<(), StoreError> {
        self.flash.erase(self.region.base, self.region.size)?;
        self.index.clear();
        self.write_offset = 0;
        self.records = 0;
        self.skipped = 0;
        crate::log_info!("Config log formatted");
        Ok(())
    }

    /// Get log usage statistics
    pub fn stats(&self) -> LogStats {
        LogStats {
            records: self.records,
            skipped: self.skipped,
            used_bytes: self.write_offset,
            free_bytes: self.region.size - self.write_offset,
            live_keys: self.index.len() as u16,
        }
    }

    /// Region this log lives in
    pub fn region(&self) -> FlashRegion {
        self.region
    }

    /// Get Flash interface reference (for testing)
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Release the Flash interface
    pub fn into_inner(self) -> F {
        self.flash
    }

    fn address(&self, offset: u32) -> u32 {
        self.region.base + offset
    }

    /// Walk the log from the start, replaying every valid record
    fn scan(&mut self) -> Result<(), StoreError> {
        let size = self.region.size as usize;
        let mut offset = 0usize;
        let mut resyncing = false;

        while offset + RecordHeader::SIZE + CRC_SIZE <= size {
            let mut header_buf = [0u8; RecordHeader::SIZE];
            self.flash
                .read(self.address(offset as u32), &mut header_buf)?;

            if is_erased(&header_buf) {
                match self.next_programmed(offset + RecordHeader::SIZE)? {
                    Some(next) => {
                        if !resyncing {
                            crate::log_warn!("Unprogrammed record slot at offset {}", offset);
                            self.skipped += 1;
                            resyncing = true;
                        }
                        offset = next;
                        continue;
                    }
                    None => break,
                }
            }

            let header = match RecordHeader::from_bytes(&header_buf) {
                Some(h) if h.is_valid(MAX_VALUE_SIZE) && offset + h.record_size() <= size => h,
                _ => {
                    // Torn header: step word by word until records line up again
                    if !resyncing {
                        crate::log_warn!("Damaged record header at offset {}", offset);
                        self.skipped += 1;
                        resyncing = true;
                    }
                    offset += RECORD_ALIGN;
                    continue;
                }
            };
            resyncing = false;

            if self.load_payload(offset as u32, &header)?.is_some() {
                self.apply(offset as u32, &header)?;
                self.records += 1;
            } else {
                crate::log_warn!(
                    "Skipping record for key {} at offset {}: CRC mismatch",
                    header.key,
                    offset
                );
                self.skipped += 1;
            }

            offset += header.record_size();
        }

        self.write_offset = offset as u32;
        Ok(())
    }

    /// Offset of the first programmed word at or after `offset`, if any
    fn next_programmed(&mut self, mut offset: usize) -> Result<Option<usize>, StoreError> {
        let size = self.region.size as usize;
        let mut chunk = [0u8; MAX_RECORD_SIZE];

        while offset < size {
            let len = chunk.len().min(size - offset);
            self.flash
                .read(self.address(offset as u32), &mut chunk[..len])?;
            if let Some(pos) = chunk[..len].iter().position(|b| *b != ERASED_BYTE) {
                return Ok(Some(offset + pos - pos % RECORD_ALIGN));
            }
            offset += len;
        }

        Ok(None)
    }

    /// Update the index with a record that passed its CRC check
    fn apply(&mut self, offset: u32, header: &RecordHeader) -> Result<(), StoreError> {
        if header.is_tombstone() {
            self.index.remove(&header.key);
            return Ok(());
        }

        let location = RecordLocation {
            offset,
            len: header.len,
        };
        self.index
            .insert(header.key, location)
            .map_err(|_| StoreError::Full)?;
        Ok(())
    }

    /// Read a record's payload and verify its CRC.
    ///
    /// Returns the payload buffer, or `None` when the CRC does not match.
    fn load_payload(
        &mut self,
        offset: u32,
        header: &RecordHeader,
    ) -> Result<Option<[u8; MAX_VALUE_SIZE]>, StoreError> {
        let len = header.len as usize;
        let payload_addr = self.address(offset) + RecordHeader::SIZE as u32;

        let mut payload = [0u8; MAX_VALUE_SIZE];
        if len > 0 {
            self.flash.read(payload_addr, &mut payload[..len])?;
        }

        let mut crc_buf = [0u8; CRC_SIZE];
        self.flash
            .read(payload_addr + header.padded_len() as u32, &mut crc_buf)?;
        let stored_crc = u32::from_le_bytes(crc_buf);

        let computed = checksum_parts(&[&header.to_bytes()[..], &payload[..len]]);
        if computed == stored_crc {
            Ok(Some(payload))
        } else {
            Ok(None)
        }
    }

    /// Append one record, programming it with a single Flash write
    fn append(&mut self, header: RecordHeader, payload: &[u8]) -> Result<u32, StoreError> {
        let record_size = header.record_size();
        let offset = self.write_offset;

        if offset as usize + record_size > self.region.size as usize {
            crate::log_warn!(
                "Config log full: {} bytes needed, {} free",
                record_size,
                self.region.size - offset
            );
            return Err(StoreError::Full);
        }

        let mut buf = [ERASED_BYTE; MAX_RECORD_SIZE];
        let header_bytes = header.to_bytes();
        buf[..RecordHeader::SIZE].copy_from_slice(&header_bytes);
        buf[RecordHeader::SIZE..RecordHeader::SIZE + payload.len()].copy_from_slice(payload);

        let crc = checksum_parts(&[&header_bytes[..], payload]);
        let crc_pos = RecordHeader::SIZE + header.padded_len();
        buf[crc_pos..crc_pos + CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        // The slot is consumed even if programming fails part-way
        self.write_offset += record_size as u32;
        self.flash
            .write(self.address(offset), &buf[..record_size])?;

        self.records += 1;
        Ok(offset)
    }
}

impl<F: FlashInterface> KvStore for FlashKvStore<F> {
    fn read(&mut self, key: u16, buf: &mut [u8]) -> Result<usize, StoreError> {
        let location = *self.index.get(&key).ok_or(StoreError::NotFound)?;
        let header = RecordHeader::value(key, location.len);

        let payload = self
            .load_payload(location.offset, &header)?
            .ok_or(StoreError::Corrupt)?;

        let len = location.len as usize;
        let n = len.min(buf.len());
        buf[..n].copy_from_slice(&payload[..n]);
        Ok(len)
    }

    fn write(&mut self, key: u16, data: &[u8]) -> Result<(), StoreError> {
        if data.len() > MAX_VALUE_SIZE {
            return Err(StoreError::TooLarge);
        }

        if !self.index.contains_key(&key) && self.index.len() == MAX_KEYS {
            return Err(StoreError::Full);
        }

        let header = RecordHeader::value(key, data.len() as u16);
        let offset = self.append(header, data)?;
        self.apply(offset, &header)
    }

    fn delete(&mut self, key: u16) -> Result<(), StoreError> {
        if !self.index.contains_key(&key) {
            return Ok(());
        }

        let header = RecordHeader::tombstone(key);
        let offset = self.append(header, &[])?;
        self.apply(offset, &header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    fn mount_fresh() -> FlashKvStore<MockFlash> {
        let mut flash = MockFlash::new();
        flash.erase(CONFIG_REGION_BASE, CONFIG_REGION_SIZE).unwrap();
        FlashKvStore::mount(flash, FlashRegion::default()).unwrap()
    }

    fn remount(store: FlashKvStore<MockFlash>) -> FlashKvStore<MockFlash> {
        let region = store.region();
        FlashKvStore::mount(store.into_inner(), region).unwrap()
    }

    fn read_u32(store: &mut FlashKvStore<MockFlash>, key: u16) -> Result<u32, StoreError> {
        let mut buf = [0u8; 4];
        store.read(key, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    #[test]
    fn test_empty_region_mounts_empty() {
        let mut store = mount_fresh();
        assert_eq!(read_u32(&mut store, 0), Err(StoreError::NotFound));

        let stats = store.stats();
        assert_eq!(stats.records, 0);
        assert_eq!(stats.used_bytes, 0);
        assert_eq!(stats.free_bytes, CONFIG_REGION_SIZE);
    }

    #[test]
    fn test_write_read_and_remount() {
        let mut store = mount_fresh();
        store.write(1, &5u32.to_le_bytes()).unwrap();
        store.write(2, &[0xAB]).unwrap();
        store.write(1, &7u32.to_le_bytes()).unwrap();

        assert_eq!(read_u32(&mut store, 1), Ok(7));

        let mut store = remount(store);
        assert_eq!(read_u32(&mut store, 1), Ok(7));

        let mut buf = [0u8; 1];
        assert_eq!(store.read(2, &mut buf), Ok(1));
        assert_eq!(buf, [0xAB]);
        assert_eq!(store.stats().records, 3);
        assert_eq!(store.stats().live_keys, 2);
    }

    #[test]
    fn test_delete_survives_remount() {
        let mut store = mount_fresh();
        store.write(3, &[1, 2]).unwrap();
        store.delete(3).unwrap();

        let mut store = remount(store);
        let mut buf = [0u8; 2];
        assert_eq!(store.read(3, &mut buf), Err(StoreError::NotFound));
    }

    #[test]
    fn test_delete_absent_key_writes_nothing() {
        let mut store = mount_fresh();
        store.delete(9).unwrap();
        assert_eq!(store.stats().used_bytes, 0);
    }

    #[test]
    fn test_torn_write_keeps_previous_value() {
        let mut store = mount_fresh();
        store.write(1, &5u32.to_le_bytes()).unwrap();

        store.flash_mut().simulate_power_loss();
        store.write(1, &9u32.to_le_bytes()).unwrap();

        // After reboot the torn record is skipped
        let mut store = remount(store);
        assert_eq!(read_u32(&mut store, 1), Ok(5));
        assert_eq!(store.stats().skipped, 1);

        // The log keeps accepting writes after the torn record
        store.write(1, &11u32.to_le_bytes()).unwrap();
        let mut store = remount(store);
        assert_eq!(read_u32(&mut store, 1), Ok(11));
    }

    #[test]
    fn test_torn_header_is_skipped() {
        let mut store = mount_fresh();
        store.write(1, &[1; 4]).unwrap();

        // Tombstone record is 12 bytes; power loss lands 6 of them
        store.flash_mut().simulate_power_loss();
        store.delete(1).unwrap();

        let mut store = remount(store);
        let mut buf = [0u8; 4];
        assert_eq!(store.read(1, &mut buf), Ok(4));
        assert_eq!(buf, [1; 4]);

        // Cursor sits past the torn bytes, aligned
        let used = store.stats().used_bytes;
        assert_eq!(used, 24);
        assert_eq!(store.stats().skipped, 1);

        store.write(2, &[2; 4]).unwrap();
        let mut store = remount(store);
        assert_eq!(store.read(2, &mut buf), Ok(4));
        assert_eq!(buf, [2; 4]);
    }

    #[test]
    fn test_corrupted_record_detected_on_read() {
        let mut store = mount_fresh();
        store.write(4, &[7; 8]).unwrap();

        // Corrupt the payload in place
        store
            .flash_mut()
            .inject_corruption(CONFIG_REGION_BASE + RecordHeader::SIZE as u32, 2);

        let mut buf = [0u8; 8];
        assert_eq!(store.read(4, &mut buf), Err(StoreError::Corrupt));
    }

    #[test]
    fn test_region_full() {
        let mut flash = MockFlash::new();
        let region = FlashRegion::new(CONFIG_REGION_BASE, 4096);
        flash.erase(region.base, region.size).unwrap();
        let mut store = FlashKvStore::mount(flash, region).unwrap();

        // 64-byte payload records are 76 bytes each
        let value = [0x11u8; MAX_VALUE_SIZE];
        let fits = 4096 / 76;
        for _ in 0..fits {
            store.write(1, &value).unwrap();
        }

        assert_eq!(store.write(1, &[0x22; MAX_VALUE_SIZE]), Err(StoreError::Full));

        let mut buf = [0u8; MAX_VALUE_SIZE];
        assert_eq!(store.read(1, &mut buf), Ok(MAX_VALUE_SIZE));
        assert_eq!(buf, value);

        store.format().unwrap();
        assert_eq!(store.read(1, &mut buf), Err(StoreError::NotFound));
        assert!(store.write(1, &value).is_ok());
    }

    #[test]
    fn test_failed_program_keeps_previous_value() {
        let mut store = mount_fresh();
        store.write(1, &5u32.to_le_bytes()).unwrap();

        store.flash_mut().fail_next_write();
        assert_eq!(
            store.write(1, &6u32.to_le_bytes()),
            Err(StoreError::Flash(FlashError::WriteFailed))
        );
        assert_eq!(read_u32(&mut store, 1), Ok(5));
    }

    #[test]
    fn test_writes_after_failed_program_survive_remount() {
        let mut store = mount_fresh();
        store.write(1, &5u32.to_le_bytes()).unwrap();

        store.flash_mut().fail_next_write();
        assert!(store.write(1, &6u32.to_le_bytes()).is_err());

        store.write(1, &7u32.to_le_bytes()).unwrap();
        store.write(2, &[9]).unwrap();
        let used = store.stats().used_bytes;

        let mut store = remount(store);
        assert_eq!(read_u32(&mut store, 1), Ok(7));
        let mut buf = [0u8; 1];
        assert_eq!(store.read(2, &mut buf), Ok(1));
        assert_eq!(buf, [9]);
        assert_eq!(store.stats().used_bytes, used);
        assert_eq!(store.stats().skipped, 1);

        // New appends land behind the live records, not over them
        store.write(3, &[3]).unwrap();
        let mut store = remount(store);
        assert_eq!(read_u32(&mut store, 1), Ok(7));
        assert_eq!(store.read(2, &mut buf), Ok(1));
        assert_eq!(buf, [9]);
        assert_eq!(store.read(3, &mut buf), Ok(1));
        assert_eq!(buf, [3]);
    }

    #[test]
    fn test_value_too_large() {
        let mut store = mount_fresh();
        assert_eq!(
            store.write(1, &[0u8; MAX_VALUE_SIZE + 1]),
            Err(StoreError::TooLarge)
        );
        assert_eq!(store.stats().used_bytes, 0);
    }

    #[test]
    fn test_misaligned_region_rejected() {
        let result = FlashKvStore::mount(MockFlash::new(), FlashRegion::new(0x040100, 4096));
        assert!(matches!(
            result,
            Err(StoreError::Flash(FlashError::InvalidAddress))
        ));
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut store = mount_fresh();
        store.write(1, &[1]).unwrap();

        store.flash_mut().set_fail_reads(true);
        let mut buf = [0u8; 1];
        assert_eq!(
            store.read(1, &mut buf),
            Err(StoreError::Flash(FlashError::ReadFailed))
        );
    }
}
