use std::{fs, path::Path};

use crate::{errors::SchoolError, school::School};

/// Writes the provided school snapshot to disk atomically by staging to a
/// temporary file.
pub fn save_school_to_file(school: &School, path: &Path) -> Result<(), SchoolError> {
    let tmp = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(school)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Loads a school snapshot from disk, returning structured errors on failure.
pub fn load_school_from_file(path: &Path) -> Result<School, SchoolError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
