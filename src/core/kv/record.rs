//! Record format for the flash configuration log
//!
//! Each write appends one record. A record is a fixed header, the payload
//! padded to a 4-byte boundary, and a CRC32 over header and payload:
//!
//! ```text
//! +-------+-------+-------+-------+------------------+---------+
//! | magic |  key  |  len  | flags | payload + pad    |  crc32  |
//! |  u16  |  u16  |  u16  |  u16  | align4(len) B    |   u32   |
//! +-------+-------+-------+-------+------------------+---------+
//! ```
//!
//! All integers are little-endian. An all-0xFF header marks the end of the log.

use bitflags::bitflags;

/// Record magic number (ASCII "NV")
pub const RECORD_MAGIC: u16 = 0x4E56;

/// Size of the CRC32 trailer in bytes
pub const CRC_SIZE: usize = 4;

/// Byte value of erased Flash, also used for payload padding
pub const ERASED_BYTE: u8 = 0xFF;

bitflags! {
    /// Record flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RecordFlags: u16 {
        /// Record deletes the key instead of storing a value
        const TOMBSTONE = 0b0000_0001;
    }
}

/// Record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Magic number (0x4E56 = "NV")
    pub magic: u16,
    /// Configuration key
    pub key: u16,
    /// Payload length in bytes (0 for tombstones)
    pub len: u16,
    /// Raw flag bits
    pub flags: u16,
}

impl RecordHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 8;

    /// Header for a value record
    pub fn value(key: u16, len: u16) -> Self {
        Self {
            magic: RECORD_MAGIC,
            key,
            len,
            flags: RecordFlags::empty().bits(),
        }
    }

    /// Header for a tombstone record
    pub fn tombstone(key: u16) -> Self {
        Self {
            magic: RECORD_MAGIC,
            key,
            len: 0,
            flags: RecordFlags::TOMBSTONE.bits(),
        }
    }

    /// Serialize header to bytes (little-endian)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.magic.to_le_bytes());
        buf[2..4].copy_from_slice(&self.key.to_le_bytes());
        buf[4..6].copy_from_slice(&self.len.to_le_bytes());
        buf[6..8].copy_from_slice(&self.flags.to_le_bytes());
        buf
    }

    /// Deserialize header from bytes (little-endian)
    ///
    /// Returns `None` if the buffer is too short or the magic does not match.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::SIZE {
            return None;
        }

        let magic = u16::from_le_bytes([buf[0], buf[1]]);
        if magic != RECORD_MAGIC {
            return None;
        }

        Some(Self {
            magic,
            key: u16::from_le_bytes([buf[2], buf[3]]),
            len: u16::from_le_bytes([buf[4], buf[5]]),
            flags: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    /// Known flags, or `None` when unknown bits are set (torn header)
    pub fn record_flags(&self) -> Option<RecordFlags> {
        RecordFlags::from_bits(self.flags)
    }

    /// True if this record deletes its key
    pub fn is_tombstone(&self) -> bool {
        self.record_flags()
            .is_some_and(|flags| flags.contains(RecordFlags::TOMBSTONE))
    }

    /// Check header consistency against the maximum payload length
    pub fn is_valid(&self, max_len: usize) -> bool {
        if self.magic != RECORD_MAGIC {
            return false;
        }

        match self.record_flags() {
            Some(flags) if flags.contains(RecordFlags::TOMBSTONE) => self.len == 0,
            Some(_) => self.len as usize <= max_len,
            None => false,
        }
    }

    /// Payload length rounded up to the 4-byte record alignment
    pub fn padded_len(&self) -> usize {
        padded_len(self.len as usize)
    }

    /// Total size of the record on Flash
    pub fn record_size(&self) -> usize {
        Self::SIZE + self.padded_len() + CRC_SIZE
    }
}

/// Round a payload length up to the 4-byte record alignment
pub const fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// True if every byte is in the erased state
pub fn is_erased(buf: &[u8]) -> bool {
    buf.iter().all(|&b| b == ERASED_BYTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_serialization() {
        let header = RecordHeader::value(7, 4);
        let decoded = RecordHeader::from_bytes(&header.to_bytes()).unwrap();

        assert_eq!(header, decoded);
        assert!(decoded.is_valid(64));
        assert!(!decoded.is_tombstone());
        assert_eq!(decoded.record_size(), 16);
    }

    #[test]
    fn test_tombstone_header() {
        let header = RecordHeader::tombstone(3);
        assert!(header.is_tombstone());
        assert!(header.is_valid(64));
        assert_eq!(header.record_size(), RecordHeader::SIZE + CRC_SIZE);
    }

    #[test]
    fn test_header_validation() {
        // Value longer than the store allows
        assert!(!RecordHeader::value(1, 65).is_valid(64));

        // Torn header: flags still erased
        let mut torn = RecordHeader::value(1, 4);
        torn.flags = 0xFFFF;
        assert!(torn.record_flags().is_none());
        assert!(!torn.is_valid(64));

        // Tombstone with payload
        let mut bad = RecordHeader::tombstone(1);
        bad.len = 2;
        assert!(!bad.is_valid(64));
    }

    #[test]
    fn test_wrong_magic_rejected() {
        let mut bytes = RecordHeader::value(1, 1).to_bytes();
        bytes[0] = 0x00;
        assert!(RecordHeader::from_bytes(&bytes).is_none());
        assert!(RecordHeader::from_bytes(&[0x56, 0x4E]).is_none());
    }

    #[test]
    fn test_padding() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(5), 8);
        assert!(is_erased(&[0xFF; 8]));
        assert!(!is_erased(&[0xFF, 0x00]));
    }
}
