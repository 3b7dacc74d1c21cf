use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use nucc_xfbin::{dispatch::OpaqueKind, Record, ResourceCodec};
use std::{io::Write, path::PathBuf};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input xfbin file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

fn opaque_extension(kind: OpaqueKind) -> &'static str {
    match kind {
        OpaqueKind::Xml => "xml",
        OpaqueKind::ParamBinary => "prm.bin",
        _ => "bin",
    }
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let xfbin = super::open(&self.file)?;
        let source = xfbin.source();

        std::fs::create_dir_all(&self.directory)
            .into_diagnostic()
            .context(format!("creating {}", &self.directory.display()))?;

        for summary in xfbin.records() {
            let index = summary.index;
            let (name, data) = match summary.record {
                Record::Model(m) => (
                    format!("{index:03}_model.nud"),
                    xfbin.codecs().model.encode(&m.resource)?,
                ),
                Record::Texture(t) => (
                    format!("{index:03}_{}", summary.name.unwrap_or("texture.nut")),
                    xfbin.codecs().texture.encode(&t.resource)?,
                ),
                Record::Opaque(o) => {
                    let start = (o.start as usize).min(source.len());
                    let end = ((o.start + o.length) as usize).min(source.len());
                    (
                        format!("{index:03}_{}.{}", o.kind, opaque_extension(o.kind))
                            .replace(' ', "_"),
                        source[start..end].to_vec(),
                    )
                }
            };

            let p = self.directory.join(name);
            info!("writing {}", p.display());

            super::create(&p, self.overwrite)?
                .write_all(&data)
                .into_diagnostic()
                .context(format!("writing {}", &p.display()))?;
        }

        Ok(())
    }
}
