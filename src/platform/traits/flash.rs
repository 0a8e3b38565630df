//! Flash interface trait
//!
//! This module defines the Flash storage interface that platform implementations must provide.
//! The configuration store persists its record log through this interface.

use crate::platform::Result;

/// Flash interface trait
///
/// Platform implementations must provide this interface for Flash read/write/erase operations.
///
/// # Flash Characteristics
///
/// - Flash is organized in blocks (typically 4 KB)
/// - Erase operations set all bytes to 0xFF
/// - Write operations can only change bits from 1→0 (must erase first to reset to 1)
/// - Flash operations are blocking and complete within bounded latency
///
/// # Safety Invariants
///
/// - Flash peripheral must be initialized before use
/// - Only one owner per Flash instance (no concurrent access)
/// - Must not erase/write firmware region (implementations must validate addresses)
///
/// # Memory Layout
///
/// ```text
/// [Firmware]            0x000000 - 0x040000 (256 KB) - DO NOT WRITE
/// [Configuration Log]   0x040000 - 0x048000 (32 KB)
/// [Free / Application]  0x048000 - end
/// ```
pub trait FlashInterface {
    /// Read `buf.len()` bytes from Flash starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is out of bounds.
    /// Returns `PlatformError::Flash(FlashError::ReadFailed)` if the read operation fails.
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write `data` to Flash starting at `address`.
    ///
    /// The target region must have been erased; writing can only clear bits.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if address is in firmware region.
    /// Returns `PlatformError::Flash(FlashError::WriteFailed)` if the write operation fails.
    fn write(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Erase `size` bytes starting at `address`, setting them to 0xFF.
    ///
    /// Both `address` and `size` must be aligned to [`block_size`](Self::block_size).
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` for protected or
    /// misaligned regions, `PlatformError::Flash(FlashError::EraseFailed)` on failure.
    fn erase(&mut self, address: u32, size: u32) -> Result<()>;

    /// Minimum erasable unit size in bytes
    fn block_size(&self) -> u32;

    /// Total Flash capacity in bytes
    fn capacity(&self) -> u32;
}
