//! Record scanning over the area after the string pools
//!
//! Records carry a head size, but the payload length stored inside a record
//! may be preceded by a variable number of nested length fields, and the
//! model group table may or may not be counted by the head size. The scanner
//! probes candidate length fields until one is consistent with the head size.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{self, Cursor, Seek, SeekFrom};
use tracing::{instrument, trace, warn};

use crate::{
    dispatch::{Dispatcher, OpaqueKind, ResourceCodec, ResourceKind},
    error::Warning,
    record::{ModelRecord, OpaqueRecord, PayloadLayout, Record, TextureRecord, RECORD_HEADER_LEN},
    strings::StringPools,
};

/// Head sizes at or above this are checked for nested length fields
const PROBE_THRESHOLD: i64 = 0x200;

/// Extra block that sits between a nested length field and the payload
const NESTED_BLOCK_LEN: i64 = 0x18;

/// Largest group count tried while probing
const MAX_PROBED_GROUPS: i64 = 9;

/// Offset of the declared texture dimensions, counted back from the payload
const TEXTURE_DIMENSIONS_OFFSET: u64 = 0xA;

/// Bytes accounted past the end of data for the final record
pub const TERMINATOR_LEN: u64 = 0xC;

/// Bytes to skip after reading a filler head size, and bytes the filler accounts for
fn filler_span(head_size: i32) -> Option<(i64, u64)> {
    match head_size {
        0x2A => Some((0x32, 0x36)),
        8 => Some((8 + 0x14, 0x20)),
        0 => Some((8, 0xC)),
        _ => None,
    }
}

fn out_of_data() -> io::Error {
    io::Error::from(io::ErrorKind::UnexpectedEof)
}

/// How the payload length of a record was determined
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// The candidate matched the head size without a group table
    Direct,
    /// The candidate matched with a group table counted by the head size
    WithGroups,
    /// As [`Resolution::WithGroups`], with a nested block before the payload
    Nested,
    /// Nothing matched, the head size is the payload length
    Fallback,
}

/// The result of probing a record's length fields
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedLength {
    pub payload_len: i64,
    pub length_field_offset: Option<u64>,
    pub resolution: Resolution,
}

type Records<M, T> = Vec<Record<<M as ResourceCodec>::Resource, <T as ResourceCodec>::Resource>>;

/// Walks the record area and collects records in source order
pub(crate) struct RecordScanner<'a, 'c, M: ResourceCodec, T: ResourceCodec> {
    data: &'a [u8],
    reader: Cursor<&'a [u8]>,
    dispatcher: &'c Dispatcher<M, T>,
    probe_limit: i64,
    records: Records<M, T>,
    warnings: Vec<Warning>,
    halted: bool,
}

impl<'a, 'c, M: ResourceCodec, T: ResourceCodec> RecordScanner<'a, 'c, M, T> {
    pub fn new(data: &'a [u8], dispatcher: &'c Dispatcher<M, T>, probe_limit: u32) -> Self {
        RecordScanner {
            data,
            reader: Cursor::new(data),
            dispatcher,
            probe_limit: probe_limit as i64,
            records: Vec::new(),
            warnings: Vec::new(),
            halted: false,
        }
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Scan every record from `start` to the end of data.
    #[instrument(skip(self, pools))]
    pub fn scan(mut self, start: u64, pools: &mut StringPools) -> (Records<M, T>, Vec<Warning>) {
        self.reader.set_position(start);

        while !self.halted && self.reader.position() + 4 < self.len() {
            let head_pos = self.reader.position();
            if self.scan_record(head_pos, pools).is_err() {
                self.truncate(head_pos);
            }
        }

        trace!(
            records = self.records.len(),
            warnings = self.warnings.len(),
            "scan finished"
        );

        (self.records, self.warnings)
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn push_opaque(&mut self, kind: OpaqueKind, start: u64, length: u64) {
        trace!(%kind, start, length, "opaque record");
        self.records
            .push(Record::Opaque(OpaqueRecord { kind, start, length }));
    }

    /// Capture everything from `head_pos` as the final record and stop.
    fn truncate(&mut self, head_pos: u64) {
        let length = self.len().saturating_sub(head_pos) + TERMINATOR_LEN;
        self.push_opaque(OpaqueKind::Truncated, head_pos, length);
        self.warn(Warning::OutOfData { offset: head_pos });
        self.halted = true;
    }

    fn scan_record(&mut self, head_pos: u64, pools: &mut StringPools) -> io::Result<()> {
        let mut head_size = self.reader.read_i32::<BigEndian>()?;

        let mut skipped = 0u64;
        while let Some((skip, accounted)) = filler_span(head_size) {
            self.reader.seek(SeekFrom::Current(skip))?;
            skipped += accounted;

            if self.reader.position() + 4 > self.len() {
                self.push_opaque(OpaqueKind::Filler, head_pos, skipped);
                self.halted = true;
                return Ok(());
            }
            head_size = self.reader.read_i32::<BigEndian>()?;
        }

        if skipped > 0 {
            // the value that ended the run is the head size of the next record
            self.reader.seek(SeekFrom::Current(-4))?;
            self.push_opaque(OpaqueKind::Filler, head_pos, skipped);
            return Ok(());
        }

        let _index = self.reader.read_i32::<BigEndian>()?;
        let _pad_flag = self.reader.read_i32::<BigEndian>()?;

        let resolved = self.resolve_length(head_pos, head_size as i64)?;
        if resolved.payload_len < 0 {
            return Err(out_of_data());
        }

        let payload_offset = self.reader.position();
        let payload_end = payload_offset + resolved.payload_len as u64;
        if payload_end > self.len() {
            return Err(out_of_data());
        }
        let data = self.data;
        let payload = &data[payload_offset as usize..payload_end as usize];
        self.reader.set_position(payload_end);

        let magic = (payload.len() >= 4).then(|| BigEndian::read_u32(payload));
        let layout = PayloadLayout {
            header_offset: head_pos,
            length_field_offset: resolved.length_field_offset,
            payload_offset,
            payload_len: resolved.payload_len as u64,
        };

        trace!(
            head_pos,
            head_size,
            payload_len = resolved.payload_len,
            resolution = ?resolved.resolution,
            magic = ?magic.map(|m| format!("{m:#010x}")),
            "record"
        );

        match ResourceKind::from_magic(magic) {
            ResourceKind::Model => self.dispatch_model(payload, layout, pools),
            ResourceKind::Texture => self.dispatch_texture(payload, layout),
            ResourceKind::Opaque(kind) => {
                let length = head_size as i64 + RECORD_HEADER_LEN as i64;
                let end = head_pos + length.max(0) as u64;
                if end > self.len() {
                    return Err(out_of_data());
                }
                self.reader.set_position(end);
                self.push_opaque(kind, head_pos, length as u64);
                Ok(())
            }
        }
    }

    /// Find the payload length of a record whose head size has just been read.
    ///
    /// Leaves the reader at the first payload byte.
    pub(crate) fn resolve_length(
        &mut self,
        head_pos: u64,
        head_size: i64,
    ) -> io::Result<ResolvedLength> {
        let probe_start = self.reader.position();
        let mut file_size = self.reader.read_i32::<BigEndian>()? as i64;
        let mut length_field_offset = probe_start;

        let mut i = 1i64;
        if head_size >= PROBE_THRESHOLD {
            while file_size != head_size - i * 4
                && ((self.reader.position() - probe_start) as i64) < head_size
                && i < self.probe_limit
            {
                for x in 1..=MAX_PROBED_GROUPS {
                    if file_size == head_size - (i * 4 + NESTED_BLOCK_LEN + 2 + x * 4) {
                        self.reader.seek(SeekFrom::Current(NESTED_BLOCK_LEN))?;
                        return Ok(ResolvedLength {
                            payload_len: file_size,
                            length_field_offset: Some(length_field_offset),
                            resolution: Resolution::Nested,
                        });
                    }
                    if file_size == head_size - (i * 4 + 2 + x * 4) {
                        return Ok(ResolvedLength {
                            payload_len: file_size,
                            length_field_offset: Some(length_field_offset),
                            resolution: Resolution::WithGroups,
                        });
                    }
                }
                length_field_offset = self.reader.position();
                file_size = self.reader.read_i32::<BigEndian>()? as i64;
                i += 1;
            }
        }

        if file_size == head_size - i * 4 {
            return Ok(ResolvedLength {
                payload_len: file_size,
                length_field_offset: Some(length_field_offset),
                resolution: Resolution::Direct,
            });
        }

        if head_size >= PROBE_THRESHOLD {
            self.warn(Warning::HeuristicExhausted {
                offset: head_pos,
                head_size: head_size as i32,
            });
        }
        self.reader.set_position(probe_start);

        Ok(ResolvedLength {
            payload_len: head_size,
            length_field_offset: None,
            resolution: Resolution::Fallback,
        })
    }

    fn read_group_codes(&mut self) -> io::Result<Vec<i32>> {
        let count = self.reader.read_u16::<BigEndian>()? as usize;
        let remaining = self.len().saturating_sub(self.reader.position()) as usize;
        if count * 4 > remaining {
            return Err(out_of_data());
        }
        (0..count)
            .map(|_| self.reader.read_i32::<BigEndian>())
            .collect()
    }

    fn dispatch_model(
        &mut self,
        payload: &[u8],
        layout: PayloadLayout,
        pools: &mut StringPools,
    ) -> io::Result<()> {
        // consumed even when the model is dropped so the scan stays aligned
        let group_codes = self.read_group_codes()?;

        match self.dispatcher.model.decode(payload) {
            Ok(resource) => {
                group_codes
                    .iter()
                    .for_each(|code| pools.assign_group_code(*code));
                self.records.push(Record::Model(ModelRecord {
                    resource,
                    original_group_count: group_codes.len(),
                    group_codes,
                    layout,
                }));
            }
            Err(error) => self.warn(Warning::SubResourceDecode {
                offset: layout.header_offset,
                kind: ResourceKind::Model,
                error,
            }),
        }
        Ok(())
    }

    fn dispatch_texture(&mut self, payload: &[u8], layout: PayloadLayout) -> io::Result<()> {
        self.reader
            .set_position(layout.payload_offset.saturating_sub(TEXTURE_DIMENSIONS_OFFSET));
        let width = self.reader.read_i16::<BigEndian>()?;
        let height = self.reader.read_i16::<BigEndian>()?;
        self.reader
            .set_position(layout.payload_offset + layout.payload_len);

        match self.dispatcher.texture.decode(payload) {
            Ok(resource) => self.records.push(Record::Texture(TextureRecord {
                resource,
                width,
                height,
                layout,
            })),
            Err(error) => self.warn(Warning::SubResourceDecode {
                offset: layout.header_offset,
                kind: ResourceKind::Texture,
                error,
            }),
        }
        Ok(())
    }
}
