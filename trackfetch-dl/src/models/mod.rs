//! Data models for trackfetch-dl
//!
//! - Manifest rows and the tag values derived from them
//! - Per-row outcomes, the batch accumulator and the rendered report

pub mod audio_metadata;
pub mod batch_report;
pub mod batch_result;
pub mod manifest_row;

pub use audio_metadata::AudioMetadata;
pub use batch_report::BatchReport;
pub use batch_result::{BatchResult, RowOutcome};
pub use manifest_row::ManifestRow;
