use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Write `bytes` to `output` so that readers see either the old file or the complete
/// new one. The data goes to a temporary file in the destination directory which is
/// renamed over `output`; on any failure the temporary file is removed on drop.
pub fn write_atomic(output: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".extend_canvas-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| Error::Resource(format!("temp file in {}: {}", dir.display(), e)))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    debug!(temp = ?tmp.path(), output = ?output, "Persisting output");
    tmp.persist(output)
        .map_err(|e| Error::Resource(format!("{}: {}", output.display(), e.error)))?;
    Ok(())
}
