//! Batch pipeline integration tests
//!
//! Real fetcher, writer and tagger against an httpmock server and a temp
//! download directory.

mod helpers;

use helpers::{flac_with_audio, flac_without_padding, manifest_csv, minimal_flac};
use httpmock::prelude::*;
use lofty::config::ParseOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag};
use std::path::Path;
use trackfetch_dl::config::DownloaderConfig;
use trackfetch_dl::services::{
    run_http_batch, BatchError, BatchOrchestrator, FetchConfig, FlacTagger, HttpFetcher,
    ManifestError,
};

fn read_tag(path: &Path) -> Tag {
    let tagged = Probe::open(path)
        .unwrap()
        .options(ParseOptions::new().read_properties(false))
        .read()
        .unwrap();
    tagged.primary_tag().cloned().unwrap()
}

#[test]
fn test_downloaded_file_is_tagged() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/track.flac");
        then.status(200).body(minimal_flac());
    });

    let dir = tempfile::tempdir().unwrap();
    let url = server.url("/track.flac");
    let manifest = manifest_csv(&[(url.as_str(), "Artist", "Song", "Record")]);

    let report = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest)
        .unwrap();

    mock.assert();
    assert_eq!(report.succeeded, vec!["Artist - Song.flac"]);
    assert!(report.errors.is_empty());

    let tag = read_tag(&dir.path().join("Artist - Song.flac"));
    assert_eq!(tag.title().as_deref(), Some("Song"));
    assert_eq!(tag.artist().as_deref(), Some("Artist"));
    assert_eq!(tag.album().as_deref(), Some("Record"));
}

#[test]
fn test_missing_columns_use_defaults() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/anon.flac");
        then.status(200).body(minimal_flac());
    });

    let dir = tempfile::tempdir().unwrap();
    let manifest = format!("FLAC URL\n{}\n", server.url("/anon.flac"));

    let report = run_http_batch(
        &DownloaderConfig::new(dir.path().to_path_buf()),
        manifest.as_bytes(),
    )
    .unwrap();

    assert_eq!(report.succeeded, vec!["Unknown Artist - Unknown Title.flac"]);
    let tag = read_tag(&dir.path().join("Unknown Artist - Unknown Title.flac"));
    assert_eq!(tag.artist().as_deref(), Some("Unknown Artist"));
    assert_eq!(tag.album(), None);
}

#[test]
fn test_separator_in_artist_is_replaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tnt.flac");
        then.status(200).body(minimal_flac());
    });

    let dir = tempfile::tempdir().unwrap();
    let url = server.url("/tnt.flac");
    let manifest = manifest_csv(&[(url.as_str(), "AC/DC", "T.N.T.", "")]);

    let report = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest)
        .unwrap();

    assert_eq!(report.succeeded, vec!["AC-DC - T.N.T..flac"]);
    let tag = read_tag(&dir.path().join("AC-DC - T.N.T..flac"));
    assert_eq!(tag.artist().as_deref(), Some("AC/DC"));
}

#[test]
fn test_duplicate_names_last_write_wins() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/first.flac");
        then.status(200).body(flac_with_audio(b"FIRST-AUDIO"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/second.flac");
        then.status(200).body(flac_with_audio(b"SECOND-AUDIO-LONGER"));
    });

    let dir = tempfile::tempdir().unwrap();
    let first = server.url("/first.flac");
    let second = server.url("/second.flac");
    let manifest = manifest_csv(&[
        (first.as_str(), "Same", "Song", "First Album"),
        (second.as_str(), "Same", "Song", "Second Album"),
    ]);

    let report = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest)
        .unwrap();

    assert_eq!(report.succeeded, vec!["Same - Song.flac", "Same - Song.flac"]);
    assert!(report.errors.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

    let path = dir.path().join("Same - Song.flac");
    let content = std::fs::read(&path).unwrap();
    assert!(content.ends_with(b"SECOND-AUDIO-LONGER"));
    assert!(!content.windows(b"FIRST-AUDIO".len()).any(|w| w == b"FIRST-AUDIO"));
    assert_eq!(read_tag(&path).album().as_deref(), Some("Second Album"));
}

#[test]
fn test_flac_without_padding_block_is_tagged() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/bare.flac");
        then.status(200).body(flac_without_padding());
    });

    let dir = tempfile::tempdir().unwrap();
    let url = server.url("/bare.flac");
    let manifest = manifest_csv(&[(url.as_str(), "Bare", "Stream", "Demo")]);

    let report = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest)
        .unwrap();

    assert_eq!(report.succeeded, vec!["Bare - Stream.flac"]);
    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    let tag = read_tag(&dir.path().join("Bare - Stream.flac"));
    assert_eq!(tag.title().as_deref(), Some("Stream"));
    assert_eq!(tag.album().as_deref(), Some("Demo"));
}

#[test]
fn test_mixed_outcomes_keep_manifest_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ok.flac");
        then.status(200).body(minimal_flac());
    });
    server.mock(|when, then| {
        when.method(GET).path("/text.flac");
        then.status(200).body("plain text, not audio");
    });
    server.mock(|when, then| {
        when.method(GET).path("/error.flac");
        then.status(500);
    });

    let dir = tempfile::tempdir().unwrap();
    let ok = server.url("/ok.flac");
    let text = server.url("/text.flac");
    let error = server.url("/error.flac");
    let manifest = manifest_csv(&[
        (error.as_str(), "E", "1", ""),
        (ok.as_str(), "O", "2", ""),
        ("", "S", "3", ""),
        (text.as_str(), "T", "4", ""),
    ]);

    let report = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest)
        .unwrap();

    assert_eq!(report.succeeded, vec!["O - 2.flac", "T - 4.flac"]);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("Failed to download E - 1.flac: "));
    assert!(report.errors[0].contains("500"));
    assert!(report.errors[1].starts_with("Downloaded but failed to tag T - 4.flac: "));

    // Untaggable payload is left on disk as downloaded
    assert_eq!(
        std::fs::read(dir.path().join("T - 4.flac")).unwrap(),
        b"plain text, not audio"
    );

    let text_report = report.render_text();
    assert!(text_report.starts_with("Successfully processed: 2 files.\n"));
    assert!(text_report.contains("  - Failed to download E - 1.flac"));
}

#[test]
fn test_unreachable_host_is_row_error() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = manifest_csv(&[("http://127.0.0.1:9/x.flac", "A", "B", "")]);

    let report = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest)
        .unwrap();

    assert!(report.succeeded.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Failed to download A - B.flac: "));
}

#[test]
fn test_invalid_utf8_aborts_before_any_fetch() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/never.flac");
        then.status(200).body(minimal_flac());
    });

    let dir = tempfile::tempdir().unwrap();
    let mut manifest = format!("FLAC URL,Artist\n{},A\n", server.url("/never.flac")).into_bytes();
    manifest.extend_from_slice(&[0xc3, 0x28, b'\n']);

    let result = run_http_batch(&DownloaderConfig::new(dir.path().to_path_buf()), &manifest);

    assert!(matches!(
        result,
        Err(BatchError::Manifest(ManifestError::Decode(_)))
    ));
    mock.assert_hits(0);
}

#[test]
fn test_orchestrator_with_explicit_components() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/a.flac");
        then.status(200).body(minimal_flac());
    });

    let dir = tempfile::tempdir().unwrap();
    let config = DownloaderConfig::new(dir.path().to_path_buf());
    let fetcher = HttpFetcher::new(&FetchConfig {
        user_agent: "trackfetch-test".to_string(),
        timeout: None,
    })
    .unwrap();
    let orchestrator = BatchOrchestrator::new(&config, fetcher, FlacTagger::new());

    let url = server.url("/a.flac");
    let report = orchestrator
        .run_manifest(&manifest_csv(&[(url.as_str(), "X", "Y", "")]))
        .unwrap();

    assert_eq!(orchestrator.download_dir(), dir.path());
    assert_eq!(report.processed_count(), 1);
}
