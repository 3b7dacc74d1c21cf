//! Routing of record payloads to the model and texture codecs

use std::fmt::{self, Debug, Display};

use crate::error::CodecError;

/// `NDP3` model payload
pub const MODEL_MAGIC: u32 = 0x4E44_5033;
/// `NTP3` texture pack payload
pub const TEXTURE_MAGIC: u32 = 0x4E54_5033;
/// Generic binary payloads
pub const BINARY_MAGIC: [u32; 2] = [0x0000_03E8, 0x0000_03EB];
/// Parameter binary payload
pub const PARAM_BINARY_MAGIC: u32 = 0xE903_0000;
/// XML payloads, with and without a byte order mark
pub const XML_MAGIC: [u32; 2] = [0xEFBB_BF3C, 0x3C3F_786D];

/// Kind of sub-resource a record holds
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// Decoded by the model codec
    Model,
    /// Decoded by the texture codec
    Texture,
    /// Kept as raw bytes
    Opaque(OpaqueKind),
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Model => write!(f, "model"),
            ResourceKind::Texture => write!(f, "texture"),
            ResourceKind::Opaque(kind) => write!(f, "{kind}"),
        }
    }
}

/// What an opaque byte range was recognized as
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpaqueKind {
    /// A run of sentinel filler entries
    Filler,
    /// Generic binary blob
    Binary,
    /// Parameter binary blob
    ParamBinary,
    /// XML document
    Xml,
    /// Bytes left over when the data ended inside a record
    Truncated,
    /// Anything else
    Unknown,
}

impl Display for OpaqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpaqueKind::Filler => "filler",
            OpaqueKind::Binary => "binary",
            OpaqueKind::ParamBinary => "param binary",
            OpaqueKind::Xml => "xml",
            OpaqueKind::Truncated => "truncated",
            OpaqueKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl ResourceKind {
    /// Classify a payload by its leading magic number
    pub fn from_magic(magic: Option<u32>) -> ResourceKind {
        match magic {
            Some(MODEL_MAGIC) => ResourceKind::Model,
            Some(TEXTURE_MAGIC) => ResourceKind::Texture,
            Some(PARAM_BINARY_MAGIC) => ResourceKind::Opaque(OpaqueKind::ParamBinary),
            Some(m) if BINARY_MAGIC.contains(&m) => ResourceKind::Opaque(OpaqueKind::Binary),
            Some(m) if XML_MAGIC.contains(&m) => ResourceKind::Opaque(OpaqueKind::Xml),
            _ => ResourceKind::Opaque(OpaqueKind::Unknown),
        }
    }
}

/// Decoder and encoder for one embedded sub-resource format
///
/// The length of the bytes returned by [`ResourceCodec::encode`] is what gets
/// written into the record's length fields when the container is rebuilt.
pub trait ResourceCodec {
    /// The decoded representation
    type Resource: Debug;

    /// Decode a payload
    fn decode(&self, payload: &[u8]) -> Result<Self::Resource, CodecError>;

    /// Encode a resource back into a payload
    fn encode(&self, resource: &Self::Resource) -> Result<Vec<u8>, CodecError>;
}

/// Keeps payloads as raw bytes
///
/// Only checks that the payload carries the expected magic number.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RawCodec {
    magic: u32,
}

impl RawCodec {
    /// Pass-through codec for `NDP3` payloads
    pub const fn model() -> Self {
        RawCodec { magic: MODEL_MAGIC }
    }

    /// Pass-through codec for `NTP3` payloads
    pub const fn texture() -> Self {
        RawCodec {
            magic: TEXTURE_MAGIC,
        }
    }
}

impl ResourceCodec for RawCodec {
    type Resource = Vec<u8>;

    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>, CodecError> {
        if !payload.starts_with(&self.magic.to_be_bytes()) {
            return Err(CodecError::Malformed(format!(
                "payload does not start with {:#010x}",
                self.magic
            )));
        }
        Ok(payload.to_vec())
    }

    fn encode(&self, resource: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(resource.clone())
    }
}

/// The pair of codecs a container routes its payloads to
#[derive(Debug, Clone)]
pub struct Dispatcher<M, T> {
    /// Codec for model records
    pub model: M,
    /// Codec for texture records
    pub texture: T,
}

impl Default for Dispatcher<RawCodec, RawCodec> {
    fn default() -> Self {
        Dispatcher {
            model: RawCodec::model(),
            texture: RawCodec::texture(),
        }
    }
}

impl<M: ResourceCodec, T: ResourceCodec> Dispatcher<M, T> {
    /// Combine a model and a texture codec
    pub fn new(model: M, texture: T) -> Self {
        Dispatcher { model, texture }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::dispatch::{OpaqueKind, RawCodec, ResourceCodec, ResourceKind};

    #[test]
    fn classify_magic() {
        assert_eq!(ResourceKind::from_magic(Some(0x4E445033)), ResourceKind::Model);
        assert_eq!(
            ResourceKind::from_magic(Some(0x4E545033)),
            ResourceKind::Texture
        );
        assert_eq!(
            ResourceKind::from_magic(Some(0x3E8)),
            ResourceKind::Opaque(OpaqueKind::Binary)
        );
        assert_eq!(
            ResourceKind::from_magic(Some(0xE9030000)),
            ResourceKind::Opaque(OpaqueKind::ParamBinary)
        );
        assert_eq!(
            ResourceKind::from_magic(Some(0x3C3F786D)),
            ResourceKind::Opaque(OpaqueKind::Xml)
        );
        assert_eq!(
            ResourceKind::from_magic(Some(0xDEADBEEF)),
            ResourceKind::Opaque(OpaqueKind::Unknown)
        );
        assert_eq!(
            ResourceKind::from_magic(None),
            ResourceKind::Opaque(OpaqueKind::Unknown)
        );
    }

    #[test]
    fn raw_codec_checks_magic() {
        let codec = RawCodec::texture();

        assert!(codec.decode(b"NTP3\x00\x01").is_ok());
        assert!(codec.decode(b"NDP3\x00\x01").is_err());
        assert!(codec.decode(b"NT").is_err());
    }
}
