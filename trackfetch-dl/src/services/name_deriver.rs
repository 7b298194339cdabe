//! Destination file naming
//!
//! Only path separators are replaced. Other characters that some
//! filesystems reject (colons, quotes, control characters, reserved device
//! names) pass through untouched, so two rows with the same artist and title
//! land on the same file and the later write wins.

/// `"{artist} - {title}.flac"` with `/` and `\` replaced by `-`
pub fn derive_destination_name(artist: &str, title: &str) -> String {
    format!("{} - {}.flac", artist, title).replace(['/', '\\'], "-")
}
