use std::path::Path;

use miette::{Context, IntoDiagnostic, Result};
use nucc_xfbin::{Container, RawCodec};

pub mod extract;
pub mod info;
pub mod rebuild;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Show the header, string pools and records of an xfbin file
    Info(info::InfoArgs),
    /// Extract every record of an xfbin file into a directory
    Extract(extract::ExtractArgs),
    /// Decode and re-save an xfbin file
    Rebuild(rebuild::RebuildArgs),
}

impl Commands {
    pub fn handle(&self) -> Result<()> {
        match self {
            Commands::Info(info) => info.handle(),
            Commands::Extract(extract) => extract.handle(),
            Commands::Rebuild(rebuild) => rebuild.handle(),
        }
    }
}

/// Payloads stay as raw bytes, no model or texture codec is bundled
pub type RawContainer = Container<RawCodec, RawCodec>;

pub fn open(path: &Path) -> Result<RawContainer> {
    let bytes = std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;

    Container::decode(bytes, RawCodec::model(), RawCodec::texture())
        .context(format!("decoding {}", path.display()))
}

pub fn create(path: &Path, overwrite: bool) -> Result<std::fs::File> {
    if !overwrite {
        std::fs::File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        std::fs::File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
