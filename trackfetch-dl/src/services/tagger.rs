//! Embeds track metadata into downloaded FLAC files using lofty
//!
//! Title and artist are always set, album only when non-empty. The tag is
//! committed in place. Files that do not probe as FLAC are rejected before
//! any write happens.
//!
//! lofty 0.19 cannot rewrite a FLAC whose final metadata block is not
//! PADDING: its own padding insertion indexes out of bounds, and a
//! rewritten comment block is never flagged as last. Such files get a
//! trailing PADDING block appended before the tag is saved.

use lofty::config::{ParseOptions, WriteOptions};
use lofty::error::LoftyError;
use lofty::file::{AudioFile, FileType, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

use crate::models::AudioMetadata;

/// Tagging errors. Row still counts as processed when these occur.
#[derive(Debug, Error)]
pub enum TagError {
    /// Could not parse the container
    #[error("Failed to read file: {0}")]
    Read(#[source] LoftyError),

    /// I/O error opening or probing the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload is not FLAC
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Container exposes no tag slot we can write
    #[error("No writable tag available for {0}")]
    NoWritableTag(String),

    /// Commit to disk failed
    #[error("Failed to write tags: {0}")]
    Save(#[source] LoftyError),
}

/// Something that can write [`AudioMetadata`] into a file on disk
pub trait Tagger {
    fn tag(&self, path: &Path, metadata: &AudioMetadata) -> Result<(), TagError>;
}

/// FLAC tagger (Vorbis comments)
#[derive(Debug, Default, Clone, Copy)]
pub struct FlacTagger;

impl FlacTagger {
    pub fn new() -> Self {
        Self
    }
}

impl Tagger for FlacTagger {
    fn tag(&self, path: &Path, metadata: &AudioMetadata) -> Result<(), TagError> {
        // Detect by content only; the .flac extension proves nothing about the payload.
        // Audio properties are not needed for a tag rewrite.
        let reader = BufReader::new(File::open(path)?);
        let probe = Probe::new(reader)
            .options(ParseOptions::new().read_properties(false))
            .guess_file_type()?;

        match probe.file_type() {
            Some(FileType::Flac) => {}
            Some(other) => return Err(TagError::UnsupportedFormat(format!("{:?}", other))),
            None => return Err(TagError::UnsupportedFormat("unrecognized content".to_string())),
        }

        let mut tagged_file = probe.read().map_err(TagError::Read)?;

        if ensure_trailing_padding(path)? {
            tracing::debug!(file = %path.display(), "Appended PADDING block");
        }

        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| TagError::NoWritableTag(format!("{:?}", tag_type)))?;

        tag.set_title(metadata.title.clone());
        tag.set_artist(metadata.artist.clone());
        if let Some(album) = &metadata.album {
            tag.set_album(album.clone());
        }

        tagged_file
            .save_to_path(path, WriteOptions::default())
            .map_err(TagError::Save)?;

        tracing::debug!(
            file = %path.display(),
            title = %metadata.title,
            artist = %metadata.artist,
            album = ?metadata.album,
            "Tagged file"
        );
        Ok(())
    }
}

const FLAC_MARKER: &[u8; 4] = b"fLaC";
const BLOCK_HEADER_LEN: usize = 4;
const BLOCK_TYPE_MASK: u8 = 0x7F;
const BLOCK_TYPE_PADDING: u8 = 1;
const LAST_BLOCK_FLAG: u8 = 0x80;
const TRAILING_PADDING_LEN: u32 = 1024;

/// Offsets of the final metadata block header and of the first byte after
/// the metadata section. `None` when the layout cannot be walked from the
/// start of the file (e.g. a leading ID3v2 tag).
fn metadata_layout(bytes: &[u8]) -> Option<(usize, usize)> {
    if !bytes.starts_with(FLAC_MARKER) {
        return None;
    }

    let mut pos = FLAC_MARKER.len();
    loop {
        let header = bytes.get(pos..pos + BLOCK_HEADER_LEN)?;
        let len = u32::from_be_bytes([0, header[1], header[2], header[3]]) as usize;
        let next = pos + BLOCK_HEADER_LEN + len;
        if next > bytes.len() {
            return None;
        }
        if header[0] & LAST_BLOCK_FLAG != 0 {
            return Some((pos, next));
        }
        pos = next;
    }
}

/// Append a PADDING block flagged as last unless the final metadata block
/// already is one. Returns whether the file was rewritten.
fn ensure_trailing_padding(path: &Path) -> Result<bool, TagError> {
    let mut bytes = std::fs::read(path)?;
    let Some((last_header, metadata_end)) = metadata_layout(&bytes) else {
        return Ok(false);
    };
    if bytes[last_header] & BLOCK_TYPE_MASK == BLOCK_TYPE_PADDING {
        return Ok(false);
    }

    bytes[last_header] &= !LAST_BLOCK_FLAG;

    let mut padding = vec![0u8; BLOCK_HEADER_LEN + TRAILING_PADDING_LEN as usize];
    padding[0] = LAST_BLOCK_FLAG | BLOCK_TYPE_PADDING;
    padding[1..BLOCK_HEADER_LEN].copy_from_slice(&TRAILING_PADDING_LEN.to_be_bytes()[1..]);
    bytes.splice(metadata_end..metadata_end, padding);

    std::fs::write(path, &bytes)?;
    Ok(true)
}
