//! # trackfetch common library
//!
//! Shared code for the trackfetch service and its tooling:
//! - Configuration loading and download directory resolution
//! - Common error type
//! - Logging bootstrap

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
