//! File sink for the per-pixel projection trace.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Buffered trace file scoped to a single projection.
///
/// The file is created (or truncated) on [`create`](DiagnosticTrace::create).
/// Call [`finish`](DiagnosticTrace::finish) to surface flush errors; dropping the
/// trace still flushes and closes the file, discarding any error.
pub struct DiagnosticTrace {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl DiagnosticTrace {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .map_err(|e| PipelineError::TraceError(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Diagnostic trace opened");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| PipelineError::TraceError(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "Diagnostic trace closed");
        Ok(())
    }
}

impl Write for DiagnosticTrace {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.log");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut trace = DiagnosticTrace::create(&path).unwrap();
        writeln!(trace, "fresh").unwrap();
        trace.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }

    #[test]
    fn test_unwritable_location_is_trace_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.log");
        let err = DiagnosticTrace::create(&path).err().unwrap();
        assert!(matches!(err, PipelineError::TraceError(_)));
    }
}
