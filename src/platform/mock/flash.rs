//! Mock Flash implementation for testing
//!
//! Provides in-memory Flash simulation for unit tests.

use crate::platform::{error::FlashError, traits::FlashInterface, Result};
use std::vec;
use std::vec::Vec;

/// Flash block size (4 KB)
const BLOCK_SIZE: u32 = 4096;

/// Flash capacity (2 MB)
const FLASH_CAPACITY: u32 = 2 * 1024 * 1024;

/// Minimum firmware size (protect first 256 KB)
const FIRMWARE_SIZE: u32 = 0x40000;

/// Mock Flash implementation
///
/// Simulates NOR Flash in memory. Supports:
/// - Read/write/erase operations with 1→0 write semantics
/// - Corruption injection for testing error handling
/// - Erase count tracking
/// - Power-loss simulation (torn writes)
/// - Forced operation failures
///
/// # Example
///
/// ```ignore
/// use nvconfig::platform::mock::MockFlash;
/// use nvconfig::platform::traits::FlashInterface;
///
/// let mut flash = MockFlash::new();
/// flash.erase(0x040000, 4096).unwrap();
///
/// flash.write(0x040000, &[0x43, 0x46]).unwrap();
///
/// let mut buf = [0u8; 2];
/// flash.read(0x040000, &mut buf).unwrap();
/// assert_eq!(buf, [0x43, 0x46]);
/// assert_eq!(flash.get_erase_count(0x040000), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockFlash {
    /// Flash storage (initialized to 0xFF - erased state)
    storage: Vec<u8>,
    /// Erase count per block
    erase_counts: Vec<u32>,
    /// Next write only lands half of its bytes
    power_loss: bool,
    /// Next write fails without touching storage
    fail_next_write: bool,
    /// All reads fail while set
    fail_reads: bool,
}

impl MockFlash {
    /// Create a new, fully erased mock Flash instance
    pub fn new() -> Self {
        let block_count = (FLASH_CAPACITY / BLOCK_SIZE) as usize;

        Self {
            storage: vec![0xFF; FLASH_CAPACITY as usize],
            erase_counts: vec![0; block_count],
            power_loss: false,
            fail_next_write: false,
            fail_reads: false,
        }
    }

    /// Get Flash contents (for test verification)
    pub fn get_contents(&self, address: u32, len: usize) -> Vec<u8> {
        self.storage[address as usize..(address as usize + len)].to_vec()
    }

    /// Overwrite bytes at `address` with a corrupt pattern, bypassing Flash rules
    pub fn inject_corruption(&mut self, address: u32, len: usize) {
        for byte in &mut self.storage[address as usize..address as usize + len] {
            *byte = 0xAA;
        }
    }

    /// Number of times the block containing `address` has been erased
    pub fn get_erase_count(&self, address: u32) -> u32 {
        self.erase_counts[(address / BLOCK_SIZE) as usize]
    }

    /// Total erase count across all blocks
    pub fn get_total_erase_count(&self) -> u32 {
        self.erase_counts.iter().sum()
    }

    /// The next write will only partially complete
    pub fn simulate_power_loss(&mut self) {
        self.power_loss = true;
    }

    /// The next write returns `WriteFailed` and leaves storage untouched
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }

    /// Make every read fail until cleared
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    fn is_writable(&self, address: u32) -> bool {
        (FIRMWARE_SIZE..FLASH_CAPACITY).contains(&address)
    }

    fn is_block_aligned(&self, address: u32) -> bool {
        address.is_multiple_of(BLOCK_SIZE)
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        if self.fail_reads {
            return Err(FlashError::ReadFailed.into());
        }

        if address as usize + buf.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }

        buf.copy_from_slice(&self.storage[address as usize..(address as usize + buf.len())]);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        if !self.is_writable(address) {
            return Err(FlashError::InvalidAddress.into());
        }

        if address as usize + data.len() > FLASH_CAPACITY as usize {
            return Err(FlashError::InvalidAddress.into());
        }

        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(FlashError::WriteFailed.into());
        }

        // Power loss lands only the first half of the data
        let write_len = if self.power_loss {
            self.power_loss = false;
            data.len() / 2
        } else {
            data.len()
        };

        // Flash can only change bits from 1→0
        let start = address as usize;
        for (cell, byte) in self.storage[start..start + write_len]
            .iter_mut()
            .zip(data.iter())
        {
            *cell &= *byte;
        }

        Ok(())
    }

    fn erase(&mut self, address: u32, size: u32) -> Result<()> {
        if !self.is_writable(address) || !self.is_block_aligned(address) {
            return Err(FlashError::InvalidAddress.into());
        }

        if !size.is_multiple_of(BLOCK_SIZE) || address + size > FLASH_CAPACITY {
            return Err(FlashError::InvalidAddress.into());
        }

        for byte in &mut self.storage[address as usize..(address + size) as usize] {
            *byte = 0xFF;
        }

        let start_block = (address / BLOCK_SIZE) as usize;
        for count in &mut self.erase_counts[start_block..start_block + (size / BLOCK_SIZE) as usize] {
            *count += 1;
        }

        Ok(())
    }

    fn block_size(&self) -> u32 {
        BLOCK_SIZE
    }

    fn capacity(&self) -> u32 {
        FLASH_CAPACITY
    }
}
