/// Error types for scan requests.
///
/// Only problems with the request itself are errors. Anything that goes
/// wrong underneath the root during a walk is skipped and never reaches
/// the caller.
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a scan before it starts.
#[derive(Debug, Error)]
pub enum ScanError {
    /// No path was supplied.
    #[error("Path is required")]
    EmptyPath,

    /// The root path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// The root path exists but is not a directory.
    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The root directory cannot be read.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while inspecting the root.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background scan thread could not be started.
    #[error("Failed to spawn scan thread: {source}")]
    SpawnFailed {
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create an I/O error with path context, mapping well-known kinds to
    /// their dedicated variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    /// `true` for errors caused by the request rather than the environment.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::SpawnFailed { .. })
    }
}
