//! Test Helper Utilities
//!
//! Shared fixtures for trackfetch-dl integration tests

#![allow(dead_code, unused_imports)]

pub mod fixtures;

pub use fixtures::{
    flac_with_audio, flac_without_padding, manifest_csv, minimal_flac, multipart_body, BOUNDARY,
};
