use std::fs;

use tracing::debug;

use crate::error::{LinkError, Res};

/// Read file at given filepath to string.
pub fn read_file(filepath: &str) -> Res<String> {
    debug!("Reading file: {}", filepath);
    fs::read_to_string(filepath).map_err(|e| LinkError::io(filepath, e))
}

/// Write file at given filepath with content.
pub fn write_file<C>(filepath: &str, content: C) -> Res<()>
where
    C: AsRef<[u8]>,
{
    debug!("Writing file: {}", filepath);
    fs::write(filepath, content).map_err(|e| LinkError::io(filepath, e))
}

pub fn file_exists(filepath: &str) -> bool {
    fs::exists(filepath).unwrap_or(false)
}
