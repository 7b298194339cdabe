//! Batch orchestration
//!
//! Drives each manifest row through name derivation, fetch, write and tag,
//! strictly one row at a time. Row states:
//!
//! ```text
//! Skipped (no URL)
//! Fetching -> FetchFailed
//!          -> Fetched -> Tagging -> TagFailed (still counted as processed)
//!                                -> Tagged
//! ```
//!
//! No row failure ever escapes `run`. The only error `run` returns is a
//! manifest failure, which aborts the whole request.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DownloaderConfig;
use crate::models::{BatchReport, BatchResult, ManifestRow, RowOutcome};
use crate::services::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::services::file_writer::{FileWriter, WriteError};
use crate::services::manifest_parser::{parse_manifest, ManifestError};
use crate::services::name_deriver::derive_destination_name;
use crate::services::ownership::FixupObserver;
use crate::services::tagger::{FlacTagger, Tagger};

/// Fetch or write failure for one row
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Request-level failures. These abort the batch; no report is produced.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// HTTP client could not be built
    #[error("Cannot start downloads: {0}")]
    Setup(#[from] FetchError),
}

/// Run one manifest with the production fetcher and tagger.
///
/// Blocking. Call from a blocking thread, never from the async runtime.
pub fn run_http_batch(config: &DownloaderConfig, bytes: &[u8]) -> Result<BatchReport, BatchError> {
    let rows = parse_manifest(bytes)?;
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let orchestrator = BatchOrchestrator::new(config, fetcher, FlacTagger::new());
    Ok(orchestrator.run(rows)?)
}

/// Sequential fetch-and-tag pipeline over one manifest
pub struct BatchOrchestrator<F, T> {
    download_dir: PathBuf,
    fetcher: F,
    writer: FileWriter,
    tagger: T,
}

impl<F: Fetcher, T: Tagger> BatchOrchestrator<F, T> {
    pub fn new(config: &DownloaderConfig, fetcher: F, tagger: T) -> Self {
        Self {
            download_dir: config.download_dir.clone(),
            fetcher,
            writer: FileWriter::new(config.chunk_size, config.ownership),
            tagger,
        }
    }

    /// Route permission fix-up failures somewhere other than the log
    pub fn with_fixup_observer(mut self, observer: Arc<dyn FixupObserver>) -> Self {
        self.writer = self.writer.with_observer(observer);
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Parse uploaded bytes and run the batch over them
    pub fn run_manifest(&self, bytes: &[u8]) -> Result<BatchReport, ManifestError> {
        self.run(parse_manifest(bytes)?)
    }

    /// Consume `rows` in order and build the report
    pub fn run<I>(&self, rows: I) -> Result<BatchReport, ManifestError>
    where
        I: IntoIterator<Item = Result<ManifestRow, ManifestError>>,
    {
        let mut result = BatchResult::new();

        for (index, row) in rows.into_iter().enumerate() {
            let row = row?;
            let outcome = self.process_row(&row);

            match &outcome {
                RowOutcome::Skipped => debug!(row = index + 1, "Skipping row without FLAC URL"),
                RowOutcome::Tagged { name } => info!(row = index + 1, file = %name, "Downloaded and tagged"),
                RowOutcome::TagFailed { name, detail } => {
                    warn!(row = index + 1, file = %name, error = %detail, "Downloaded but tagging failed")
                }
                RowOutcome::FetchFailed { name, detail } => {
                    warn!(row = index + 1, file = %name, error = %detail, "Download failed")
                }
                RowOutcome::Unexpected { name, detail } => {
                    warn!(row = index + 1, file = %name, error = %detail, "Row processing panicked")
                }
            }

            result.record(outcome);
        }

        info!(
            processed = result.succeeded.len(),
            errors = result.errors.len(),
            dir = %self.download_dir.display(),
            "Batch complete"
        );

        Ok(BatchReport::new(result, self.download_dir.clone()))
    }

    /// Run one row to a terminal state. Never panics, never errors.
    pub fn process_row(&self, row: &ManifestRow) -> RowOutcome {
        let Some(url) = row.url() else {
            return RowOutcome::Skipped;
        };
        let name = derive_destination_name(&row.artist, &row.title);

        match panic::catch_unwind(AssertUnwindSafe(|| self.fetch_and_tag(url, &name, row))) {
            Ok(outcome) => outcome,
            Err(payload) => RowOutcome::Unexpected {
                name,
                detail: panic_message(payload.as_ref()),
            },
        }
    }

    fn fetch_and_tag(&self, url: &str, name: &str, row: &ManifestRow) -> RowOutcome {
        let path = self.download_dir.join(name);

        if let Err(e) = self.download(url, &path) {
            return RowOutcome::FetchFailed {
                name: name.to_string(),
                detail: e.to_string(),
            };
        }

        // The file is on disk from here on; a tagger panic is a tag failure
        let tagged = panic::catch_unwind(AssertUnwindSafe(|| {
            self.tagger.tag(&path, &row.metadata())
        }));
        match tagged {
            Ok(Ok(())) => RowOutcome::Tagged {
                name: name.to_string(),
            },
            Ok(Err(e)) => RowOutcome::TagFailed {
                name: name.to_string(),
                detail: e.to_string(),
            },
            Err(payload) => RowOutcome::TagFailed {
                name: name.to_string(),
                detail: panic_message(payload.as_ref()),
            },
        }
    }

    fn download(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        let mut stream = self.fetcher.fetch(url)?;
        Ok(self.writer.write(&mut stream, path)?)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
