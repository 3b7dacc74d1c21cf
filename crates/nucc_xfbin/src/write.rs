//! Types for rebuilding NUCC containers
//!

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Write};
use tracing::{instrument, trace};

use crate::{
    dispatch::{Dispatcher, ResourceCodec, ResourceKind},
    error::{Error, Result},
    record::{ModelRecord, OpaqueRecord, PayloadLayout, Record, TextureRecord},
    scan::TERMINATOR_LEN,
};

/// Writes records back out against the bytes they were decoded from
///
/// Anything that was not decoded is copied from the source, so only the
/// payloads and their two length fields can change.
pub(crate) struct Rebuilder<'a, 'c, M, T> {
    source: Cursor<&'a [u8]>,
    codecs: &'c Dispatcher<M, T>,
    inner: Cursor<Vec<u8>>,
}

impl<'a, 'c, M: ResourceCodec, T: ResourceCodec> Rebuilder<'a, 'c, M, T> {
    pub fn new(source: &'a [u8], codecs: &'c Dispatcher<M, T>) -> Self {
        Rebuilder {
            source: Cursor::new(source),
            codecs,
            inner: Cursor::new(Vec::with_capacity(source.len())),
        }
    }

    fn source_len(&self) -> u64 {
        self.source.get_ref().len() as u64
    }

    fn copy(&mut self, start: u64, end: u64) -> Result<()> {
        let len = self.source_len();
        if start > end || end > len {
            return Err(Error::OutOfBounds { start, end, len });
        }
        let data = *self.source.get_ref();
        self.inner
            .write_all(&data[start as usize..end as usize])?;
        Ok(())
    }

    /// Write every record and return the rebuilt container.
    #[instrument(skip_all, err)]
    pub fn finish(
        mut self,
        first_record_start: u64,
        records: &[Record<M::Resource, T::Resource>],
    ) -> Result<Vec<u8>> {
        self.copy(0, first_record_start.min(self.source_len()))?;

        for (index, record) in records.iter().enumerate() {
            let last = index + 1 == records.len();
            match record {
                Record::Opaque(opaque) => self.write_opaque(opaque, last)?,
                Record::Model(model) => self.write_model(index, model)?,
                Record::Texture(texture) => self.write_texture(index, texture)?,
            }
        }

        Ok(self.inner.into_inner())
    }

    fn write_opaque(&mut self, record: &OpaqueRecord, last: bool) -> Result<()> {
        let end = if last {
            (record.start + record.length.saturating_sub(TERMINATOR_LEN)).min(self.source_len())
        } else {
            record.start + record.length
        };
        trace!(kind = %record.kind, start = record.start, end, "copy opaque record");
        self.copy(record.start, end)
    }

    fn write_model(&mut self, index: usize, record: &ModelRecord<M::Resource>) -> Result<()> {
        let payload = self
            .codecs
            .model
            .encode(&record.resource)
            .map_err(|source| Error::Codec {
                index,
                kind: ResourceKind::Model,
                source,
            })?;

        let group_delta = (record.group_codes.len() as i64 - record.original_group_count as i64) * 4;
        self.write_payload(index, &record.layout, &payload, group_delta)?;

        let group_count =
            u16::try_from(record.group_codes.len()).map_err(|_| Error::LengthOverflow(index))?;
        self.inner.write_u16::<BigEndian>(group_count)?;
        for code in &record.group_codes {
            self.inner.write_i32::<BigEndian>(*code)?;
        }

        Ok(())
    }

    fn write_texture(&mut self, index: usize, record: &TextureRecord<T::Resource>) -> Result<()> {
        let payload = self
            .codecs
            .texture
            .encode(&record.resource)
            .map_err(|source| Error::Codec {
                index,
                kind: ResourceKind::Texture,
                source,
            })?;

        self.write_payload(index, &record.layout, &payload, 0)
    }

    /// Patch the outer length, copy the hidden fields in front of the payload and write it.
    fn write_payload(
        &mut self,
        index: usize,
        layout: &PayloadLayout,
        payload: &[u8],
        extra_delta: i64,
    ) -> Result<()> {
        let delta = payload.len() as i64 - layout.payload_len as i64 + extra_delta;

        let len = self.source_len();
        if layout.header_offset + 4 > len {
            return Err(Error::OutOfBounds {
                start: layout.header_offset,
                end: layout.header_offset + 4,
                len,
            });
        }
        self.source.set_position(layout.header_offset);
        let head_size = self.source.read_i32::<BigEndian>()?;
        let head_size = i32::try_from(head_size as i64 + delta)
            .map_err(|_| Error::LengthOverflow(index))?;

        trace!(
            index,
            offset = layout.header_offset,
            delta,
            head_size,
            "patch record"
        );

        self.inner.write_i32::<BigEndian>(head_size)?;

        match layout.length_field_offset {
            Some(offset) => {
                let payload_len =
                    i32::try_from(payload.len()).map_err(|_| Error::LengthOverflow(index))?;
                self.copy(layout.header_offset + 4, offset)?;
                self.inner.write_i32::<BigEndian>(payload_len)?;
                self.copy(offset + 4, layout.payload_offset)?;
            }
            None => self.copy(layout.header_offset + 4, layout.payload_offset)?,
        }

        self.inner.write_all(payload)?;
        Ok(())
    }
}
