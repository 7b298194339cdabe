//! Service configuration for trackfetch-dl
//!
//! Resolves CLI arguments, environment and the TOML file into explicit
//! values once at startup. Nothing downstream reads ambient state: the
//! resulting [`DownloaderConfig`] is handed to each batch.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use trackfetch_common::config::{CompiledDefaults, TomlConfig};
use trackfetch_common::{Error, Result};

use crate::services::fetcher::FetchConfig;
use crate::services::ownership::OwnershipPolicy;

/// Everything one batch needs
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Destination for every file of the batch (no subdirectories)
    pub download_dir: PathBuf,
    /// Applied to each written file when present
    pub ownership: Option<OwnershipPolicy>,
    /// Copy buffer size for streaming downloads to disk
    pub chunk_size: usize,
    pub fetch: FetchConfig,
}

impl DownloaderConfig {
    /// Config with compiled defaults and no ownership fix-up
    pub fn new(download_dir: PathBuf) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            download_dir,
            ownership: None,
            chunk_size: defaults.chunk_size,
            fetch: FetchConfig {
                user_agent: defaults.user_agent,
                timeout: None,
            },
        }
    }
}

/// Full service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub downloader: DownloaderConfig,
    pub bind_address: SocketAddr,
    pub max_upload_bytes: usize,
}

impl ServiceConfig {
    /// Resolve from TOML plus CLI overrides.
    ///
    /// `download_dir` should already exist when ownership matching is
    /// enabled, since the policy is read from its metadata.
    pub fn resolve(
        toml: &TomlConfig,
        download_dir: PathBuf,
        cli_bind: Option<String>,
    ) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let bind = cli_bind
            .or_else(|| toml.bind_address.clone())
            .unwrap_or(defaults.bind_address);
        let bind_address: SocketAddr = bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        let file_mode = toml.file_mode.unwrap_or(defaults.file_mode);
        if file_mode > 0o7777 {
            return Err(Error::Config(format!("Invalid file_mode {:o}", file_mode)));
        }

        let match_ownership = toml
            .match_directory_ownership
            .unwrap_or(defaults.match_directory_ownership);
        let ownership = if match_ownership {
            match OwnershipPolicy::from_directory(&download_dir, file_mode) {
                Ok(policy) => {
                    info!(
                        uid = policy.uid,
                        gid = policy.gid,
                        mode = %format!("{:o}", policy.mode),
                        "Matching download directory ownership"
                    );
                    Some(policy)
                }
                Err(e) => {
                    warn!(
                        dir = %download_dir.display(),
                        error = %e,
                        "Cannot read download directory ownership, fix-up disabled"
                    );
                    None
                }
            }
        } else {
            None
        };

        let chunk_size = toml.chunk_size.unwrap_or(defaults.chunk_size);
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }

        Ok(Self {
            downloader: DownloaderConfig {
                download_dir,
                ownership,
                chunk_size,
                fetch: FetchConfig {
                    user_agent: toml.user_agent.clone().unwrap_or(defaults.user_agent),
                    timeout: toml.fetch_timeout_secs.map(Duration::from_secs),
                },
            },
            bind_address,
            max_upload_bytes: toml.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
        })
    }
}
