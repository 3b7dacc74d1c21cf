//! Base types for structure of the NUCC container header.

use binrw::{BinRead, BinWrite};

/// Offset at which the property pool starts; also the base of the directory pool offset
pub const POOL_START: u64 = 0x44;

/// Offset the first record base is counted from
const RECORD_BASE: i64 = 0x1C;

/// Selects which fixed offset constants govern the header layout
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaddingVariant {
    /// Flag `0x4F` (79)
    Standard,

    /// Flag `0x3F` (63)
    Compact,

    /// Any other flag, laid out like [`PaddingVariant::Standard`]
    Other(i32),
}

impl PaddingVariant {
    /// Padding between the end of the second padding region and the first record
    pub fn record_padding(&self) -> i64 {
        match self {
            PaddingVariant::Compact => 0xC,
            PaddingVariant::Standard | PaddingVariant::Other(_) => 0x18,
        }
    }

    /// The raw flag as stored in the header
    pub fn flag(&self) -> i32 {
        match self {
            PaddingVariant::Standard => 0x4F,
            PaddingVariant::Compact => 0x3F,
            PaddingVariant::Other(flag) => *flag,
        }
    }
}

impl From<i32> for PaddingVariant {
    fn from(value: i32) -> Self {
        match value {
            0x4F => PaddingVariant::Standard,
            0x3F => PaddingVariant::Compact,
            other => PaddingVariant::Other(other),
        }
    }
}

/// NUCC file header
///
/// Defines the fixed part of the header which always starts with "NUCC".
/// All data is stored in big endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Default)]
#[brw(magic = b"NUCC", big)]
pub struct NuccHeader {
    /// Selects the offset constants, see [`PaddingVariant`]
    pub padding_flag: i32,

    /// Skipped by every known reader
    pub reserved: [u8; 8],

    /// Base used to locate the first record
    pub first_record_base: i32,

    /// Observed values are 3 and 5
    pub unknown_14: i32,

    /// Usually repeats the padding flag
    pub flag_echo: i16,

    /// Unknown
    pub unknown_1a: i16,

    /// Number of strings in the property pool
    pub property_count: i32,

    /// Size in bytes of the property pool
    pub property_block_size: i32,

    /// Number of strings in the directory pool, including a leading empty entry
    pub directory_count: i32,

    /// Size in bytes of the directory pool
    pub file_name_block_size: i32,

    /// Number of strings in the file name pool, plus one
    pub file_name_count: i32,

    /// Offset of the first padding region, counted from the file name pool
    pub first_padding_offset: i32,

    /// Tracks the file name count on every observed file
    pub unknown_34: i32,

    /// Size in bytes of the first padding region
    pub first_padding_size: i32,

    /// Number of 4 byte entries in the second padding region
    pub second_padding_count: i32,

    /// Number of 8 byte slots before the first record, used by animation containers
    pub extra_slot_count: i32,
}

impl NuccHeader {
    /// The variant selected by [`NuccHeader::padding_flag`]
    pub fn variant(&self) -> PaddingVariant {
        PaddingVariant::from(self.padding_flag)
    }

    /// Absolute offset of the first record
    pub fn first_record_start(&self) -> i64 {
        self.first_record_base as i64
            + RECORD_BASE
            + self.variant().record_padding()
            + self.extra_slot_count as i64 * 8
    }
}
