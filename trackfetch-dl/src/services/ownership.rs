//! Best-effort ownership and permission fix-up for written files
//!
//! The download directory is usually a host volume. Files written by the
//! service are re-owned to the directory's uid/gid and given a fixed mode so
//! the host user can manage them. Failures here never affect a row's outcome;
//! they are handed to a [`FixupObserver`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ownership/permission fix-up errors. Logged only.
#[derive(Debug, Error)]
pub enum PermissionFixupError {
    #[error("chown {} to {uid}:{gid} failed: {detail}", path.display())]
    Chown {
        path: PathBuf,
        uid: u32,
        gid: u32,
        detail: String,
    },

    #[error("chmod {} to {mode:o} failed: {source}", path.display())]
    Chmod {
        path: PathBuf,
        mode: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("ownership fix-up is not supported on this platform")]
    Unsupported,
}

/// Receives fix-up failures
pub trait FixupObserver: Send + Sync {
    fn fixup_failed(&self, path: &Path, error: &PermissionFixupError);
}

/// Default observer: warn through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingFixupObserver;

impl FixupObserver for LoggingFixupObserver {
    fn fixup_failed(&self, path: &Path, error: &PermissionFixupError) {
        tracing::warn!(
            file = %path.display(),
            error = %error,
            "Permission fix failed"
        );
    }
}

/// Owner, group and mode to stamp on each written file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipPolicy {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
}

impl OwnershipPolicy {
    /// Copy owner and group from `dir`'s own metadata
    #[cfg(unix)]
    pub fn from_directory(dir: &Path, mode: u32) -> std::io::Result<Self> {
        use std::os::unix::fs::MetadataExt;

        let meta = std::fs::metadata(dir)?;
        Ok(Self {
            uid: meta.uid(),
            gid: meta.gid(),
            mode,
        })
    }

    #[cfg(not(unix))]
    pub fn from_directory(_dir: &Path, _mode: u32) -> std::io::Result<Self> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "directory ownership is only available on Unix-like platforms",
        ))
    }

    #[cfg(unix)]
    pub fn apply(&self, path: &Path) -> Result<(), PermissionFixupError> {
        use nix::unistd::{chown, Gid, Uid};
        use std::os::unix::fs::PermissionsExt;

        chown(path, Some(Uid::from_raw(self.uid)), Some(Gid::from_raw(self.gid))).map_err(
            |errno| PermissionFixupError::Chown {
                path: path.to_path_buf(),
                uid: self.uid,
                gid: self.gid,
                detail: errno.to_string(),
            },
        )?;

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(self.mode)).map_err(
            |source| PermissionFixupError::Chmod {
                path: path.to_path_buf(),
                mode: self.mode,
                source,
            },
        )
    }

    #[cfg(not(unix))]
    pub fn apply(&self, _path: &Path) -> Result<(), PermissionFixupError> {
        Err(PermissionFixupError::Unsupported)
    }
}
