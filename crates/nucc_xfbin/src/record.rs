//! Records held by a container

use crate::dispatch::{OpaqueKind, ResourceKind};

/// Size of a record header: head size, index and pad flag
pub const RECORD_HEADER_LEN: u64 = 0xC;

/// Where the parts of a decoded record live in the source
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PayloadLayout {
    /// Offset of the record's outer length field
    pub header_offset: u64,
    /// Offset of the record's own payload length field, `None` when the length probe fell back
    pub length_field_offset: Option<u64>,
    /// Offset of the first payload byte
    pub payload_offset: u64,
    /// Payload length as found in the source
    pub payload_len: u64,
}

impl PayloadLayout {
    /// Number of bytes between the outer length field and the payload length field
    pub fn header_field_width(&self) -> u64 {
        self.length_field_offset.unwrap_or(self.payload_offset) - (self.header_offset + 4)
    }
}

/// A decoded model record
#[derive(Debug, Clone)]
pub struct ModelRecord<M> {
    /// The decoded model
    pub resource: M,
    /// Group codes stored after the payload
    pub group_codes: Vec<i32>,
    pub(crate) original_group_count: usize,
    pub(crate) layout: PayloadLayout,
}

impl<M> ModelRecord<M> {
    /// Location of this record in the source
    pub fn layout(&self) -> &PayloadLayout {
        &self.layout
    }

    /// Number of group codes the source stored for this model
    pub fn original_group_count(&self) -> usize {
        self.original_group_count
    }
}

/// A decoded texture pack record
#[derive(Debug, Clone)]
pub struct TextureRecord<T> {
    /// The decoded texture pack
    pub resource: T,
    /// Declared width, informational only
    pub width: i16,
    /// Declared height, informational only
    pub height: i16,
    pub(crate) layout: PayloadLayout,
}

impl<T> TextureRecord<T> {
    /// Location of this record in the source
    pub fn layout(&self) -> &PayloadLayout {
        &self.layout
    }
}

/// A byte range copied verbatim on rebuild
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OpaqueRecord {
    /// What the range was recognized as
    pub kind: OpaqueKind,
    /// Offset of the first byte
    pub start: u64,
    /// Number of bytes, may run past the end of the source for the final record
    pub length: u64,
}

/// One entry of a container, in source order
#[derive(Debug, Clone)]
pub enum Record<M, T> {
    /// A model and its group table
    Model(ModelRecord<M>),
    /// A texture pack
    Texture(TextureRecord<T>),
    /// Anything kept as raw bytes
    Opaque(OpaqueRecord),
}

impl<M, T> Record<M, T> {
    /// The kind of sub-resource held
    pub fn kind(&self) -> ResourceKind {
        match self {
            Record::Model(_) => ResourceKind::Model,
            Record::Texture(_) => ResourceKind::Texture,
            Record::Opaque(o) => ResourceKind::Opaque(o.kind),
        }
    }

    /// Offset of the record's header in the source
    pub fn offset(&self) -> u64 {
        match self {
            Record::Model(m) => m.layout.header_offset,
            Record::Texture(t) => t.layout.header_offset,
            Record::Opaque(o) => o.start,
        }
    }
}
