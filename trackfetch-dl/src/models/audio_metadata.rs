//! Tag values written into the downloaded audio container

use serde::Serialize;

/// Title and artist are always written. Album is written only when present;
/// an empty album is omitted rather than written as an empty tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioMetadata {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
}

impl AudioMetadata {
    pub fn new(title: &str, artist: &str, album: &str) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            album: (!album.is_empty()).then(|| album.to_string()),
        }
    }
}
