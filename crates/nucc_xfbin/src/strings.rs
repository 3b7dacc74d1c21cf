//! String pools stored between the header and the record area

use byteorder::ReadBytesExt;
use indexmap::IndexMap;
use std::io::{Cursor, Seek, SeekFrom};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result, Warning},
    header::HeaderLayout,
};

/// File name entries that only exist for bookkeeping
const SKIPPED_FILE_NAMES: [&str; 2] = ["Page0", "index"];

/// Entries containing this start the group name section
const GROUP_MARKER: &str = "bod";

/// Entries containing [`GROUP_MARKER`] and this are ordinary files
const GROUP_MARKER_EXCLUDE: &str = "body";

/// Entries containing this start the bone name section
const BONE_MARKER: &str = "trall";

/// Fixed padding after the 4 byte aligned end of the pools
const POOL_TRAILER: u64 = 0xC;

/// The three string pools of a container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringPools {
    /// Resource property (chunk type) names
    pub properties: Vec<String>,
    /// Directory paths, in the order textures reference them
    pub directories: Vec<String>,
    /// Included file names without the `Page0` and `index` entries
    pub file_names: Vec<String>,
    /// Group name to group code, inferred from the file names
    pub group_names: IndexMap<String, i32>,
    /// Bone names, inferred from the file names
    pub bone_names: Vec<String>,
    /// Position right after the pools and both padding regions
    pub end: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum InferState {
    Idle,
    Groups,
    Bones,
}

fn read_string(reader: &mut Cursor<&[u8]>) -> Result<String> {
    let mut raw = Vec::new();
    loop {
        let char = reader
            .read_u8()
            .map_err(|_| Error::Truncated("string pools"))?;
        if char == b'\0' {
            break;
        }
        raw.push(char);
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn skip(reader: &mut Cursor<&[u8]>, amount: u64) -> Result<()> {
    let target = reader.position() + amount;
    if target > reader.get_ref().len() as u64 {
        return Err(Error::Truncated("string pools"));
    }
    reader.seek(SeekFrom::Start(target))?;
    Ok(())
}

impl StringPools {
    /// Read the pools starting at the current position of `reader`.
    ///
    /// Returns a warning when group name inference had to be abandoned.
    #[instrument(skip_all, err)]
    pub fn read(
        reader: &mut Cursor<&[u8]>,
        layout: &HeaderLayout,
        infer_groups: bool,
    ) -> Result<(StringPools, Option<Warning>)> {
        let mut pools = StringPools::default();

        for _ in 0..layout.property_count {
            pools.properties.push(read_string(reader)?);
        }

        skip(reader, 1)?;
        if reader.position() != layout.directory_start + 1 {
            debug!(
                position = reader.position(),
                expected = layout.directory_start,
                "directory pool does not start at its declared offset"
            );
        }
        for _ in 0..layout.directory_count {
            pools.directories.push(read_string(reader)?);
        }

        skip(reader, 1)?;
        for _ in 0..layout.file_name_count {
            let name = read_string(reader)?;
            if SKIPPED_FILE_NAMES.contains(&name.as_str()) {
                continue;
            }
            pools.file_names.push(name);
        }

        let aligned = (reader.position() + 3) & !3;
        skip(reader, aligned - reader.position() + POOL_TRAILER)?;
        skip(reader, layout.first_padding_size)?;
        skip(reader, layout.second_padding_size)?;
        pools.end = reader.position();

        if pools.end > layout.first_record_start {
            debug!(
                end = pools.end,
                first_record_start = layout.first_record_start,
                "string pools overlap the record area"
            );
        }

        trace!(
            properties = pools.properties.len(),
            directories = pools.directories.len(),
            file_names = pools.file_names.len(),
            "read string pools"
        );

        let warning = if infer_groups {
            pools.infer_groups().err()
        } else {
            None
        };

        Ok((pools, warning))
    }

    /// Derive group and bone names from the file name pool.
    ///
    /// On failure the group mapping is cleared entirely.
    pub fn infer_groups(&mut self) -> core::result::Result<(), Warning> {
        self.group_names.clear();
        self.bone_names.clear();

        let mut state = InferState::Idle;
        for name in &self.file_names {
            match state {
                InferState::Bones => {
                    if name.contains(' ') {
                        self.bone_names.push(name.clone());
                    }
                    continue;
                }
                _ if name.contains(BONE_MARKER) => {
                    state = InferState::Bones;
                    continue;
                }
                InferState::Groups => {
                    if !name.contains(' ') {
                        let mut key = match name.find('_') {
                            Some(i) => name[i + 1..].to_string(),
                            None => name.clone(),
                        };
                        if self.group_names.contains_key(&key) {
                            key.push('2');
                        }
                        if self.group_names.contains_key(&key) {
                            self.group_names.clear();
                            return Err(Warning::GroupNameHeuristic {
                                reason: format!("group name {key} appears more than twice"),
                            });
                        }
                        self.group_names.insert(key, 0);
                    }
                }
                InferState::Idle => {
                    if name.contains(GROUP_MARKER)
                        && !name.contains(' ')
                        && !name.contains(GROUP_MARKER_EXCLUDE)
                    {
                        state = InferState::Groups;
                    }
                }
            }
        }

        Ok(())
    }

    /// Bind a group code seen in a model to the first group name without one.
    pub fn assign_group_code(&mut self, code: i32) {
        if self.group_names.is_empty() || self.group_names.values().any(|v| *v == code) {
            return;
        }
        if let Some(slot) = self.group_names.values_mut().find(|v| **v == 0) {
            *slot = code;
        }
    }

    /// Look up the group name bound to a code
    pub fn group_name(&self, code: i32) -> Option<&str> {
        self.group_names
            .iter()
            .find(|(_, v)| **v == code)
            .map(|(k, _)| k.as_str())
    }
}
