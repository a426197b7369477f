use serde::Serialize;
use std::{fs, path::Path};

use crate::{
    error::{MapperError, Result},
    mapping::OutputRecord,
};

/// Top-level `{"records": [...]}` wrapper handed to the bulk import.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Envelope {
    pub records: Vec<OutputRecord>,
}

impl Envelope {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pretty JSON with two-space indentation and no trailing newline.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Writes already rendered output in one call, so the destination is only
/// created once rendering has succeeded.
pub fn write_output<P: AsRef<Path>>(path: P, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, contents).map_err(|e| MapperError::io(path, e))
}
