//! Outer header parsing

use binrw::BinRead;
use std::io::Cursor;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{NuccHeader, PaddingVariant, POOL_START},
};

/// Signature every container starts with
pub const CONTAINER_MAGIC: &[u8; 4] = b"NUCC";

/// Prefix of a CRI archive that still wraps the container
pub const PACKED_MAGIC: &[u8; 3] = b"CPK";

/// Byte offsets derived from the outer header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLayout {
    /// The header as stored in the file
    pub raw: NuccHeader,
    /// Which offset constants apply
    pub variant: PaddingVariant,
    /// Where the record area begins
    pub first_record_start: u64,
    /// Number of strings in the property pool
    pub property_count: usize,
    /// Where the directory pool begins
    pub directory_start: u64,
    /// Number of directory strings, excluding the leading empty entry
    pub directory_count: usize,
    /// Where the file name pool begins
    pub file_name_start: u64,
    /// Number of file name entries to read
    pub file_name_count: usize,
    /// Where the first padding region begins
    pub first_padding_start: u64,
    /// Size in bytes of the first padding region
    pub first_padding_size: u64,
    /// Size in bytes of the second padding region
    pub second_padding_size: u64,
}

fn count(value: i32) -> usize {
    value.max(0) as usize
}

fn size(value: i32) -> u64 {
    value.max(0) as u64
}

impl HeaderLayout {
    /// Validate the signature and read the header, leaving `reader` at the start of the property pool.
    #[instrument(skip_all, err)]
    pub fn read(reader: &mut Cursor<&[u8]>) -> Result<HeaderLayout> {
        let data = *reader.get_ref();

        if !data.starts_with(CONTAINER_MAGIC) {
            if data.starts_with(PACKED_MAGIC) {
                return Err(Error::NeedsExtraction);
            }
            return Err(Error::InvalidFormat);
        }

        if (data.len() as u64) < POOL_START {
            return Err(Error::Truncated("header"));
        }

        reader.set_position(0);
        let raw = NuccHeader::read(reader)?;

        let first_record_start = raw.first_record_start();
        if first_record_start < POOL_START as i64 {
            return Err(Error::InvalidFormat);
        }

        let directory_start = POOL_START + size(raw.property_block_size);
        let file_name_start = directory_start + size(raw.file_name_block_size);

        let layout = HeaderLayout {
            variant: raw.variant(),
            first_record_start: first_record_start as u64,
            property_count: count(raw.property_count),
            directory_start,
            directory_count: count(raw.directory_count.saturating_sub(1)),
            file_name_start,
            file_name_count: count(raw.file_name_count.saturating_sub(1)),
            first_padding_start: file_name_start + size(raw.first_padding_offset),
            first_padding_size: size(raw.first_padding_size),
            second_padding_size: size(raw.second_padding_count) * 4,
            raw,
        };

        debug!(
            variant = ?layout.variant,
            first_record_start = layout.first_record_start,
            directory_start = layout.directory_start,
            file_name_start = layout.file_name_start,
            "read header"
        );

        Ok(layout)
    }
}
