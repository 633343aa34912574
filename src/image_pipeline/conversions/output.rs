//! File access for pipeline inputs and outputs.

use std::io::Write;
use std::path::Path;

use tracing::debug;
use crate::image_pipeline::common::error::{PipelineError, Result};

pub fn read_input<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))
}

/// Writes `encoded` to a temporary file next to `output_path`, then renames it
/// over the destination, so a failure never leaves a partial file behind.
///
/// A new output gets the permissions of a freshly created file (`0o666` masked
/// by the umask on Unix); an existing destination keeps its own.
pub fn persist_output<P: AsRef<Path>>(output_path: P, encoded: &[u8]) -> Result<()> {
    let output_path = output_path.as_ref();
    let write_error = |e: std::io::Error| {
        PipelineError::OutputWriteError(format!("{}: {}", output_path.display(), e))
    };

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".img2sphere-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut staged = builder.tempfile_in(dir).map_err(write_error)?;
    if let Ok(existing) = std::fs::metadata(output_path) {
        staged
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?;
    }
    staged.write_all(encoded).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged.persist(output_path).map_err(|e| write_error(e.error))?;

    debug!(output = %output_path.display(), bytes = encoded.len(), "Output persisted");
    Ok(())
}
