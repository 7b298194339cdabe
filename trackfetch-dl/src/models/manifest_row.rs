//! One manifest entry describing a single track to fetch and tag

use serde::Serialize;

use super::AudioMetadata;

/// Column holding the remote file location. Rows without it are skipped.
pub const COLUMN_FLAC_URL: &str = "FLAC URL";
pub const COLUMN_ARTIST: &str = "Artist";
pub const COLUMN_TITLE: &str = "Title";
pub const COLUMN_ALBUM: &str = "Album";

pub const DEFAULT_ARTIST: &str = "Unknown Artist";
pub const DEFAULT_TITLE: &str = "Unknown Title";

/// Parsed manifest row.
///
/// Defaults apply only when a column is absent from the header or the row is
/// too short to reach it; a present-but-empty cell stays empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    pub flac_url: Option<String>,
    pub artist: String,
    pub title: String,
    pub album: String,
}

impl ManifestRow {
    /// Build a row from optional column values, filling in defaults
    pub fn new(
        flac_url: Option<String>,
        artist: Option<String>,
        title: Option<String>,
        album: Option<String>,
    ) -> Self {
        Self {
            flac_url,
            artist: artist.unwrap_or_else(|| DEFAULT_ARTIST.to_string()),
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            album: album.unwrap_or_default(),
        }
    }

    /// URL to fetch, or None when the row should be skipped (absent or empty)
    pub fn url(&self) -> Option<&str> {
        self.flac_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Tag values to embed once the file has landed
    pub fn metadata(&self) -> AudioMetadata {
        AudioMetadata::new(&self.title, &self.artist, &self.album)
    }
}
