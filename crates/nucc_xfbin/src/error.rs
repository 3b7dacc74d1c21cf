//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::dispatch::ResourceKind;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file does not start with the NUCC signature
    #[error("file is not a valid xfbin container")]
    InvalidFormat,

    /// file is still wrapped in a CPK archive
    #[error("file is still packed inside a CPK archive")]
    #[diagnostic(
        code(nucc::needs_extraction),
        help("extract the archive with CRI Packed File Maker before opening it")
    )]
    NeedsExtraction,

    /// the header or string pools end before their declared size
    #[error("container ended while reading {0}")]
    Truncated(&'static str),

    /// a sub-resource could not be encoded while rebuilding
    #[error("unable to encode {kind} record {index}")]
    Codec {
        index: usize,
        kind: ResourceKind,
        #[source]
        source: CodecError,
    },

    /// a recorded byte range does not exist in the source
    #[error("byte range {start:#x}..{end:#x} is outside of the source ({len:#x} bytes)")]
    OutOfBounds { start: u64, end: u64, len: u64 },

    /// a patched length no longer fits its field
    #[error("patched length for record {0} does not fit its field")]
    LengthOverflow(usize),
}

/// Error reported by a model or texture codec
#[derive(Error, Diagnostic, Debug)]
pub enum CodecError {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// {0}
    #[error("{0}")]
    Malformed(String),
}

/// A condition that dropped or reshaped a single record without aborting the decode
#[derive(Error, Diagnostic, Debug)]
pub enum Warning {
    /// no candidate length matched, the record size was trusted instead
    #[error("length probe exhausted for record at {offset:#x} (head size {head_size:#x})")]
    HeuristicExhausted { offset: u64, head_size: i32 },

    /// the embedded resource could not be decoded and the record was dropped
    #[error("dropped {kind} record at {offset:#x}")]
    SubResourceDecode {
        offset: u64,
        kind: ResourceKind,
        #[source]
        error: CodecError,
    },

    /// group name inference failed and the mapping was cleared
    #[error("group names could not be inferred: {reason}")]
    GroupNameHeuristic { reason: String },

    /// scanning reached the end of data inside a record
    #[error("data ended inside the record at {offset:#x}")]
    OutOfData { offset: u64 },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
