//! Types for reading NUCC containers
//!

use bon::Builder;
use std::{
    fmt::{self, Debug},
    io::Cursor,
};
use tracing::{debug, instrument, warn};

use crate::{
    dispatch::{Dispatcher, ResourceCodec, ResourceKind},
    error::{Result, Warning},
    header::HeaderLayout,
    record::Record,
    scan::RecordScanner,
    strings::StringPools,
    write::Rebuilder,
};

/// Options for how a container should be decoded
#[derive(Debug, Clone, Copy, Builder)]
pub struct DecodeOptions {
    /// Upper bound on the number of candidate length fields tried per record
    ///
    /// Older containers need 10, some later ones need 15.
    #[builder(default = 10)]
    pub probe_limit: u32,

    /// Whether group and bone names are inferred from the file name pool
    #[builder(default = true)]
    pub infer_group_names: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions::builder().build()
    }
}

/// The portion of `path` after the last `/` or `\`
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Summary of one record as handed out by [`Container::records`]
pub struct RecordSummary<'a, M, T> {
    /// Position of the record in the container
    pub index: usize,
    /// The kind of sub-resource held
    pub kind: ResourceKind,
    /// Texture name, taken from the directory pool
    pub name: Option<&'a str>,
    /// The record itself
    pub record: &'a Record<M, T>,
}

impl<M: Debug, T: Debug> Debug for RecordSummary<'_, M, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RecordSummary")
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("offset", &self.record.offset())
            .finish()
    }
}

/// A decoded NUCC container
///
/// Owns the source bytes so that every record can be rebuilt without
/// touching anything that was not edited.
///
/// ```no_run
/// use nucc_xfbin::{Container, RawCodec, Record};
///
/// fn grow_first_model(bytes: Vec<u8>) -> nucc_xfbin::error::Result<Vec<u8>> {
///     let mut xfbin = Container::decode(bytes, RawCodec::model(), RawCodec::texture())?;
///
///     for warning in xfbin.warnings() {
///         println!("{warning}");
///     }
///
///     if let Some(Record::Model(model)) = xfbin.record_mut(0) {
///         model.resource.extend_from_slice(&[0u8; 16]);
///     }
///
///     xfbin.rebuild()
/// }
/// ```
pub struct Container<M: ResourceCodec, T: ResourceCodec> {
    source: Vec<u8>,
    codecs: Dispatcher<M, T>,
    header: HeaderLayout,
    pools: StringPools,
    records: Vec<Record<M::Resource, T::Resource>>,
    warnings: Vec<Warning>,
}

impl<M: ResourceCodec, T: ResourceCodec> Debug for Container<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Container")
            .field("len", &self.source.len())
            .field("variant", &self.header.variant)
            .field("records", &self.records.len())
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

impl<M: ResourceCodec, T: ResourceCodec> Container<M, T> {
    /// Decode a container with the default [`DecodeOptions`].
    pub fn decode(bytes: impl Into<Vec<u8>>, model: M, texture: T) -> Result<Container<M, T>> {
        Self::decode_with(bytes, Dispatcher::new(model, texture), DecodeOptions::default())
    }

    /// Decode a container.
    ///
    /// Fails only when the header or the string pools cannot be read. Records
    /// that could not be decoded are dropped and reported in [`Container::warnings`].
    #[instrument(skip_all, err)]
    pub fn decode_with(
        bytes: impl Into<Vec<u8>>,
        codecs: Dispatcher<M, T>,
        options: DecodeOptions,
    ) -> Result<Container<M, T>> {
        let source = bytes.into();

        let (header, mut pools, mut warnings) = {
            let mut reader = Cursor::new(source.as_slice());
            let header = HeaderLayout::read(&mut reader)?;
            let (pools, warning) =
                StringPools::read(&mut reader, &header, options.infer_group_names)?;

            let warnings = warning
                .into_iter()
                .inspect(|w| warn!("{}", w))
                .collect::<Vec<_>>();
            (header, pools, warnings)
        };

        let (records, scan_warnings) = RecordScanner::new(&source, &codecs, options.probe_limit)
            .scan(header.first_record_start, &mut pools);
        warnings.extend(scan_warnings);

        debug!(
            records = records.len(),
            warnings = warnings.len(),
            "decoded container"
        );

        Ok(Container {
            source,
            codecs,
            header,
            pools,
            records,
            warnings,
        })
    }

    /// Number of records in this container
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this container holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all records in source order
    pub fn records(&self) -> impl Iterator<Item = RecordSummary<'_, M::Resource, T::Resource>> {
        let mut textures = 0usize;
        self.records.iter().enumerate().map(move |(index, record)| {
            let name = match record {
                Record::Texture(_) => {
                    textures += 1;
                    self.texture_name(textures - 1)
                }
                _ => None,
            };
            RecordSummary {
                index,
                kind: record.kind(),
                name,
                record,
            }
        })
    }

    /// Name of the `n`-th texture record, the basename of the `n`-th directory entry
    pub fn texture_name(&self, n: usize) -> Option<&str> {
        self.pools.directories.get(n).map(|d| basename(d))
    }

    /// Get a record by index
    pub fn record(&self, index: usize) -> Option<&Record<M::Resource, T::Resource>> {
        self.records.get(index)
    }

    /// Get a record by index for editing
    ///
    /// Edits to model and texture resources are picked up by [`Container::rebuild`].
    pub fn record_mut(&mut self, index: usize) -> Option<&mut Record<M::Resource, T::Resource>> {
        self.records.get_mut(index)
    }

    /// The parsed outer header
    pub fn header(&self) -> &HeaderLayout {
        &self.header
    }

    /// The string pools
    pub fn pools(&self) -> &StringPools {
        &self.pools
    }

    /// Everything that was dropped or guessed while decoding
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// The bytes this container was decoded from
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// The codecs resources are decoded and encoded with
    pub fn codecs(&self) -> &Dispatcher<M, T> {
        &self.codecs
    }

    /// Serialize the container, re-encoding models and textures and patching their lengths.
    ///
    /// An unmodified container rebuilds to its source bytes.
    pub fn rebuild(&self) -> Result<Vec<u8>> {
        Rebuilder::new(&self.source, &self.codecs).finish(self.header.first_record_start, &self.records)
    }
}
