//! Persists fetched byte streams into the download directory
//!
//! The destination is created (or truncated) and the stream copied in
//! fixed-size chunks. The file handle is released on every exit path. A
//! failure mid-stream leaves the partial file on disk; it is not cleaned up.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::ownership::{FixupObserver, LoggingFixupObserver, OwnershipPolicy};

/// Write errors. Reported with the download-failure template.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Destination could not be opened
    #[error("Cannot open destination: {0}")]
    Open(#[source] std::io::Error),

    /// Reading the fetched body failed part way
    #[error("Download interrupted: {0}")]
    Source(#[source] std::io::Error),

    /// Writing to the destination failed part way
    #[error("Write failed: {0}")]
    Sink(#[source] std::io::Error),
}

/// Chunked file writer with optional ownership fix-up
pub struct FileWriter {
    chunk_size: usize,
    ownership: Option<OwnershipPolicy>,
    observer: Arc<dyn FixupObserver>,
}

impl FileWriter {
    pub fn new(chunk_size: usize, ownership: Option<OwnershipPolicy>) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            ownership,
            observer: Arc::new(LoggingFixupObserver),
        }
    }

    /// Replace the observer that receives fix-up failures
    pub fn with_observer(mut self, observer: Arc<dyn FixupObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Copy `source` into `path`, returning the number of bytes written.
    ///
    /// Ownership is fixed up right after creation and again after the last
    /// chunk, so the file is host-manageable even if a later step fails.
    pub fn write(&self, source: &mut dyn Read, path: &Path) -> Result<u64, WriteError> {
        let mut file = File::create(path).map_err(WriteError::Open)?;
        self.fix_up(path);

        let mut buf = vec![0u8; self.chunk_size];
        let mut written: u64 = 0;
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(WriteError::Source(e)),
            };
            file.write_all(&buf[..n]).map_err(WriteError::Sink)?;
            written += n as u64;
        }
        file.flush().map_err(WriteError::Sink)?;
        drop(file);

        self.fix_up(path);

        tracing::debug!(file = %path.display(), bytes = written, "Wrote file");
        Ok(written)
    }

    fn fix_up(&self, path: &Path) {
        if let Some(policy) = &self.ownership {
            if let Err(e) = policy.apply(path) {
                self.observer.fixup_failed(path, &e);
            }
        }
    }
}
