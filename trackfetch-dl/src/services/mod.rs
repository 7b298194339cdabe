//! Pipeline components, leaves first:
//! manifest parser, name deriver, fetcher, writer (with ownership fix-up),
//! tagger, and the batch orchestrator that drives them row by row.

pub mod batch_orchestrator;
pub mod fetcher;
pub mod file_writer;
pub mod manifest_parser;
pub mod name_deriver;
pub mod ownership;
pub mod tagger;

pub use batch_orchestrator::{run_http_batch, BatchError, BatchOrchestrator, DownloadError};
pub use fetcher::{FetchConfig, FetchError, FetchStream, Fetcher, HttpFetcher};
pub use file_writer::{FileWriter, WriteError};
pub use manifest_parser::{parse_manifest, ManifestError, ManifestRows};
pub use name_deriver::derive_destination_name;
pub use ownership::{FixupObserver, LoggingFixupObserver, OwnershipPolicy, PermissionFixupError};
pub use tagger::{FlacTagger, TagError, Tagger};
