//! Lookup of textures across several loaded containers

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::{
    dispatch::ResourceCodec,
    read::Container,
    record::Record,
};

/// Where a texture can be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureLocation {
    /// Label of the container the texture was registered from
    pub container: String,
    /// Index of the texture record in that container
    pub record: usize,
    /// Declared width
    pub width: i16,
    /// Declared height
    pub height: i16,
}

/// Table of texture names to the containers that hold them
///
/// Models reference textures by name, and those textures often live in a
/// different container. Register every loaded container, then resolve names.
///
/// ```no_run
/// use nucc_xfbin::{Container, RawCodec, TextureTable};
///
/// fn find(bytes: Vec<u8>) -> nucc_xfbin::error::Result<()> {
///     let xfbin = Container::decode(bytes, RawCodec::model(), RawCodec::texture())?;
///
///     let mut textures = TextureTable::default();
///     textures.register("1nrtbod1.xfbin", &xfbin);
///
///     if let Some(location) = textures.resolve("1nrtbod1.nut") {
///         println!("{} record {}", location.container, location.record);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    textures: IndexMap<String, TextureLocation>,
}

impl TextureTable {
    /// Add every named texture of `container`.
    ///
    /// Names already in the table keep their first location. Returns the
    /// number of textures added.
    #[instrument(skip(self, label, container), fields(label = %label.as_ref()))]
    pub fn register<M: ResourceCodec, T: ResourceCodec>(
        &mut self,
        label: impl AsRef<str>,
        container: &Container<M, T>,
    ) -> usize {
        let label = label.as_ref();
        let mut added = 0;

        for summary in container.records() {
            let (Record::Texture(texture), Some(name)) = (summary.record, summary.name) else {
                continue;
            };

            if let Some(existing) = self.textures.get(name) {
                debug!(name, existing = %existing.container, "texture already registered");
                continue;
            }

            self.textures.insert(
                name.to_string(),
                TextureLocation {
                    container: label.to_string(),
                    record: summary.index,
                    width: texture.width,
                    height: texture.height,
                },
            );
            added += 1;
        }

        added
    }

    /// Find where a texture lives
    pub fn resolve(&self, name: &str) -> Option<&TextureLocation> {
        self.textures.get(name)
    }

    /// Number of textures in the table
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the table holds no textures
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Iterate over texture names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(|s| s.as_str())
    }
}
