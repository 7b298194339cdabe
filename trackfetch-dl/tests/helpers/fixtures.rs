//! Manifest, upload and audio fixtures

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "trackfetch-test-boundary";

/// STREAMINFO (44.1 kHz, stereo, 16-bit, zero samples) with the given
/// block header byte
fn flac_streaminfo(header: u8) -> Vec<u8> {
    let mut bytes = b"fLaC".to_vec();
    bytes.extend_from_slice(&[header, 0x00, 0x00, 0x22]);
    bytes.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]);
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x00, 0x00, 0x00]);
    bytes.extend_from_slice(&[0u8; 16]);
    bytes
}

/// Small FLAC lofty will parse: STREAMINFO plus a trailing 8-byte PADDING
/// block, no frames.
pub fn minimal_flac() -> Vec<u8> {
    flac_with_audio(b"")
}

/// [`minimal_flac`] followed by `audio` in place of frames. Tag rewrites
/// leave these bytes untouched, so they identify which payload landed.
pub fn flac_with_audio(audio: &[u8]) -> Vec<u8> {
    let mut bytes = flac_streaminfo(0x00);
    bytes.extend_from_slice(&[0x81, 0x00, 0x00, 0x08]);
    bytes.extend_from_slice(&[0u8; 8]);
    bytes.extend_from_slice(audio);
    bytes
}

/// Lone STREAMINFO flagged as the last metadata block
pub fn flac_without_padding() -> Vec<u8> {
    flac_streaminfo(0x80)
}

/// Build a manifest with the standard header from (url, artist, title, album) rows
pub fn manifest_csv(rows: &[(&str, &str, &str, &str)]) -> Vec<u8> {
    let mut csv = String::from("FLAC URL,Artist,Title,Album\n");
    for (url, artist, title, album) in rows {
        csv.push_str(&format!("{},{},{},{}\n", url, artist, title, album));
    }
    csv.into_bytes()
}

/// Encode one form part. `filename` of `None` yields a plain text field.
pub fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: text/csv\r\n\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
