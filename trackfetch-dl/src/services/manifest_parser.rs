//! Manifest parsing
//!
//! Turns uploaded CSV bytes into a lazy, single-pass sequence of
//! [`ManifestRow`]s in file order. The whole upload must decode as UTF-8;
//! beyond that, only dictionary-style lookup of the recognized columns is
//! performed. Unknown columns are ignored, missing ones take defaults.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use thiserror::Error;

use crate::models::manifest_row::{COLUMN_ALBUM, COLUMN_ARTIST, COLUMN_FLAC_URL, COLUMN_TITLE};
use crate::models::ManifestRow;

/// Manifest errors. Both variants are fatal to the whole request.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Upload bytes are not UTF-8
    #[error("Manifest is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),

    /// Reader failure while walking the rows
    #[error("Malformed manifest: {0}")]
    Csv(#[from] csv::Error),
}

/// Header positions of the recognized columns
#[derive(Debug, Clone, Default)]
struct ColumnIndex {
    flac_url: Option<usize>,
    artist: Option<usize>,
    title: Option<usize>,
    album: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        // Last occurrence wins for duplicated header names
        let find = |name: &str| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == name)
                .last()
                .map(|(i, _)| i)
        };
        Self {
            flac_url: find(COLUMN_FLAC_URL),
            artist: find(COLUMN_ARTIST),
            title: find(COLUMN_TITLE),
            album: find(COLUMN_ALBUM),
        }
    }

    fn row(&self, record: &StringRecord) -> ManifestRow {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::to_string);
        ManifestRow::new(
            cell(self.flac_url),
            cell(self.artist),
            cell(self.title),
            cell(self.album),
        )
    }
}

/// Lazy row iterator over an upload. Consumed once.
pub struct ManifestRows<'a> {
    records: StringRecordsIntoIter<&'a [u8]>,
    columns: ColumnIndex,
}

impl Iterator for ManifestRows<'_> {
    type Item = Result<ManifestRow, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|r| self.columns.row(&r))
                .map_err(ManifestError::from),
        )
    }
}

/// Decode `bytes` and prepare a row iterator over them
pub fn parse_manifest(bytes: &[u8]) -> Result<ManifestRows<'_>, ManifestError> {
    let text = std::str::from_utf8(bytes)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers);

    tracing::debug!(
        columns = headers.len(),
        has_url_column = columns.flac_url.is_some(),
        "Parsed manifest header"
    );

    Ok(ManifestRows {
        records: reader.into_records(),
        columns,
    })
}
