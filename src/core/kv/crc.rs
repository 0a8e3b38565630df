//! CRC32 calculation for flash record validation
//!
//! Every record in the configuration log carries a CRC32 over its header and
//! payload, so torn or decayed records are never returned to readers.

use crc::{Crc, CRC_32_ISO_HDLC};

/// CRC32 algorithm (ISO HDLC / Ethernet / ZIP)
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Calculate CRC32 checksum over several slices as if they were contiguous
///
/// # Example
///
/// ```
/// use nvconfig::core::kv::crc::{calculate_crc32, checksum_parts};
///
/// assert_eq!(checksum_parts(&[&b"1234"[..], &b"56789"[..]]), calculate_crc32(b"123456789"));
/// ```
pub fn checksum_parts(parts: &[&[u8]]) -> u32 {
    let mut digest = CRC32.digest();
    for part in parts {
        digest.update(part);
    }
    digest.finalize()
}

/// Calculate CRC32 checksum of data
///
/// Uses the CRC-32-ISO-HDLC algorithm (polynomial 0x04C11DB7).
pub fn calculate_crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_known_values() {
        let test_cases = [
            (b"" as &[u8], 0x00000000u32),
            (b"a", 0xE8B7BE43),
            (b"abc", 0x352441C2),
            (b"123456789", 0xCBF43926),
        ];

        for (data, expected) in test_cases {
            assert_eq!(calculate_crc32(data), expected);
        }
    }

    #[test]
    fn test_checksum_parts_matches_contiguous() {
        let header = [0x56u8, 0x4E, 0x03, 0x00];
        let payload = [1u8, 2, 3, 4, 5];

        let mut joined = header.to_vec();
        joined.extend_from_slice(&payload);

        assert_eq!(
            checksum_parts(&[&header[..], &payload[..]]),
            calculate_crc32(&joined)
        );
    }

    #[test]
    fn test_crc32_detects_corruption() {
        let data = b"Original data";
        let crc = calculate_crc32(data);

        let mut corrupted = data.to_vec();
        corrupted[0] ^= 0x01;

        assert_eq!(calculate_crc32(data), crc);
        assert_ne!(calculate_crc32(&corrupted), crc);
    }
}
