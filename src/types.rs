//! Shared types: [`ByteOrder`] and [`FormatVersion`].

use std::fmt;

/// miniSEED format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// miniSEED v2 (SEED Manual, 48-byte fixed header + blockettes).
    V2,
    /// miniSEED v3 (FDSN, 40-byte fixed header, little-endian).
    V3,
}

impl FormatVersion {
    /// Identify the record format from its first bytes.
    ///
    /// v3 records start with `MS` followed by the version byte `3`;
    /// anything else is treated as a v2 fixed header.
    pub fn detect(lead: &[u8]) -> Self {
        if lead.len() >= 3 && lead[0] == b'M' && lead[1] == b'S' && lead[2] == 3 {
            Self::V3
        } else {
            Self::V2
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => write!(f, "miniSEED v2"),
            Self::V3 => write!(f, "miniSEED v3"),
        }
    }
}

/// Byte order of the multi-byte fields in a v2 fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    pub(crate) fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Big => u16::from_be_bytes(bytes),
            Self::Little => u16::from_le_bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_v3_magic() {
        assert_eq!(FormatVersion::detect(b"MS\x03\x00"), FormatVersion::V3);
    }

    #[test]
    fn test_detect_v2_fallback() {
        assert_eq!(FormatVersion::detect(b"000001D "), FormatVersion::V2);
        // "MS" with a different version byte is not v3
        assert_eq!(FormatVersion::detect(b"MS2"), FormatVersion::V2);
        assert_eq!(FormatVersion::detect(b""), FormatVersion::V2);
    }

    #[test]
    fn test_byte_order_u16() {
        assert_eq!(ByteOrder::Big.u16([0x07, 0xE8]), 2024);
        assert_eq!(ByteOrder::Little.u16([0xE8, 0x07]), 2024);
    }
}
