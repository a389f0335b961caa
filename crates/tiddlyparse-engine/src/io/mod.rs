use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::WikiError;

/// Read a wiki file into memory.
pub fn read_file(path: &Path) -> Result<String, WikiError> {
    Ok(fs::read_to_string(path)?)
}

/// Replace `path` with `content` atomically.
///
/// The content goes to a temporary file in the same directory, which is then
/// renamed over the target. If anything fails before the rename the target is
/// untouched and the temporary file is removed when it is dropped. An existing
/// target's permissions carry over to the new file.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), WikiError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.persist(path)?;

    log::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
