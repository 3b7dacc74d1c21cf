use clap::Args;
use itertools::Itertools;
use miette::Result;
use nucc_xfbin::{Record, ResourceKind};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input xfbin file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

fn size(record: &Record<Vec<u8>, Vec<u8>>) -> u64 {
    match record {
        Record::Model(m) => m.resource.len() as u64,
        Record::Texture(t) => t.resource.len() as u64,
        Record::Opaque(o) => o.length,
    }
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let xfbin = super::open(&self.file)?;
        let header = xfbin.header();
        let pools = xfbin.pools();

        println!("{}", self.file.display().bold());
        println!(
            "  layout: {:?} (flag {:#x}), first record at {:#x}",
            header.variant,
            header.variant.flag(),
            header.first_record_start
        );
        println!("  properties: {}", pools.properties.iter().join(", "));
        println!("  directories: {}", pools.directories.len());
        println!("  file names: {}", pools.file_names.len());
        if !pools.group_names.is_empty() {
            println!(
                "  groups: {}",
                pools
                    .group_names
                    .iter()
                    .map(|(name, code)| format!("{name}={code:#x}"))
                    .join(", ")
            );
        }
        if !pools.bone_names.is_empty() {
            println!("  bones: {}", pools.bone_names.len());
        }

        println!();
        for summary in xfbin.records() {
            let kind = match summary.kind {
                ResourceKind::Model => summary.kind.green().to_string(),
                ResourceKind::Texture => summary.kind.blue().to_string(),
                ResourceKind::Opaque(_) => summary.kind.dimmed().to_string(),
            };
            let detail = match summary.record {
                Record::Model(m) => format!(
                    "groups [{}]",
                    m.group_codes
                        .iter()
                        .map(|c| pools.group_name(*c).map_or(format!("{c:#x}"), String::from))
                        .join(", ")
                ),
                Record::Texture(t) => format!(
                    "{} {}x{}",
                    summary.name.unwrap_or("?"),
                    t.width,
                    t.height
                ),
                Record::Opaque(_) => String::new(),
            };

            println!(
                "{:>4} {:#010x} {:>8} {:<14} {}",
                summary.index,
                summary.record.offset(),
                size(summary.record),
                kind,
                detail
            );
        }

        if !xfbin.warnings().is_empty() {
            println!();
            for warning in xfbin.warnings() {
                println!("⚠ {}", warning.yellow());
            }
        }

        Ok(())
    }
}
