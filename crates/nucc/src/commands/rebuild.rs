use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{io::Write, path::PathBuf};
use tracing::{info, warn};

#[derive(Args)]
pub struct RebuildArgs {
    /// An input xfbin file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target xfbin file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Fail unless the output matches the input byte for byte
    #[arg(long, default_value_t = false)]
    verify: bool,
}

impl RebuildArgs {
    pub fn handle(&self) -> Result<()> {
        let xfbin = super::open(&self.file)?;
        if !xfbin.warnings().is_empty() {
            warn!(
                count = xfbin.warnings().len(),
                "records were dropped or guessed, the output may differ"
            );
        }

        let rebuilt = xfbin.rebuild().context("rebuilding xfbin file")?;

        if self.verify {
            let source = xfbin.source();
            if let Some(offset) = source.iter().zip(&rebuilt).position(|(a, b)| a != b) {
                return Err(miette!("output differs from the input at {offset:#x}"));
            }
            if source.len() != rebuilt.len() {
                return Err(miette!(
                    "output is {:#x} bytes, the input is {:#x} bytes",
                    rebuilt.len(),
                    source.len()
                ));
            }
            info!("output matches the input");
        }

        info!("writing {}", &self.output.display());
        super::create(&self.output, self.overwrite)?
            .write_all(&rebuilt)
            .into_diagnostic()
            .context(format!("writing {}", &self.output.display()))?;

        Ok(())
    }
}
