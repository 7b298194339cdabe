//! Configuration loading and download directory resolution
//!
//! Download directory priority order:
//! 1. Command-line argument (highest priority)
//! 2. `TRACKFETCH_DOWNLOAD_DIR` environment variable
//! 3. `DOWNLOAD_DIR` environment variable (legacy container deployments)
//! 4. `download_dir` from the TOML config file
//! 5. Compiled default (`/downloads`)
//!
//! A missing or unreadable config file never stops startup: the resolver
//! logs a warning and falls through to the next tier.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Primary environment variable naming the download directory
pub const DOWNLOAD_DIR_ENV: &str = "TRACKFETCH_DOWNLOAD_DIR";

/// Legacy environment variable, honored when the primary one is unset
pub const LEGACY_DOWNLOAD_DIR_ENV: &str = "DOWNLOAD_DIR";

/// Compiled-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub download_dir: PathBuf,
    pub bind_address: String,
    pub log_level: String,
    pub max_upload_bytes: usize,
    pub chunk_size: usize,
    pub file_mode: u32,
    pub match_directory_ownership: bool,
    pub user_agent: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            download_dir: PathBuf::from("/downloads"),
            bind_address: "0.0.0.0:5000".to_string(),
            log_level: "info".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
            chunk_size: 8192,
            file_mode: 0o664,
            match_directory_ownership: true,
            user_agent: format!("trackfetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. "info" or "trackfetch_dl=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// On-disk TOML configuration. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub download_dir: Option<PathBuf>,
    pub bind_address: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub max_upload_bytes: Option<usize>,
    pub chunk_size: Option<usize>,
    /// Permission bits applied to written files, e.g. `0o664` (436)
    pub file_mode: Option<u32>,
    /// Reapply the download directory's owner and group to each written file
    pub match_directory_ownership: Option<bool>,
    /// Per-request fetch timeout. Absent means no timeout.
    pub fetch_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load from an explicit path, or from the platform config location.
    ///
    /// Never fails: problems are logged and defaults returned.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_file(),
        };

        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} - continuing with defaults", e);
                Self::default()
            }
        }
    }
}

/// Locate the config file for the platform, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("trackfetch").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/trackfetch/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolves the download directory from CLI, environment, TOML and defaults
pub struct DownloadDirResolver<'a> {
    cli_arg: Option<PathBuf>,
    toml: Option<&'a TomlConfig>,
}

impl<'a> DownloadDirResolver<'a> {
    pub fn new() -> Self {
        Self {
            cli_arg: None,
            toml: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml(mut self, toml: &'a TomlConfig) -> Self {
        self.toml = Some(toml);
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [DOWNLOAD_DIR_ENV, LEGACY_DOWNLOAD_DIR_ENV] {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    return PathBuf::from(value);
                }
            }
        }

        if let Some(path) = self.toml.and_then(|t| t.download_dir.clone()) {
            return path;
        }

        CompiledDefaults::for_current_platform().download_dir
    }
}

impl Default for DownloadDirResolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Makes sure the download directory exists before any batch runs
pub struct DownloadDirInitializer {
    download_dir: PathBuf,
}

impl DownloadDirInitializer {
    pub fn new(download_dir: PathBuf) -> Self {
        Self { download_dir }
    }

    /// Create the directory (and parents) if missing. Idempotent.
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if self.download_dir.is_dir() {
            return Ok(());
        }
        if self.download_dir.exists() {
            return Err(Error::Config(format!(
                "Download path exists but is not a directory: {}",
                self.download_dir.display()
            )));
        }
        std::fs::create_dir_all(&self.download_dir)?;
        info!("Created download directory: {}", self.download_dir.display());
        Ok(())
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}
