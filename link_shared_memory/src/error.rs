//! Error types for Link channel operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing the Link channel
#[derive(Error, Debug)]
pub enum LinkError {
    /// Backing resource does not exist
    #[error("Link resource not found: {}", path.display())]
    NotFound {
        /// Resource path
        path: PathBuf,
    },

    /// Backing resource exists but has not been sized for the record yet
    #[error("Link resource {} is {len} bytes, record needs {required}", path.display())]
    ResourceTooSmall {
        /// Resource path
        path: PathBuf,
        /// Current file length
        len: u64,
        /// Record size
        required: usize,
    },

    /// Buffer handed to the channel is not exactly one record
    #[error("Invalid record size: {size} bytes (expected {expected})")]
    InvalidSize {
        /// Provided size in bytes
        size: usize,
        /// Record size in bytes
        expected: usize,
    },

    /// Permission denied
    #[error("Permission denied accessing Link resource: {}", path.display())]
    PermissionDenied {
        /// Resource path
        path: PathBuf,
    },

    /// Resource path has no parent directory or file name to watch
    #[error("Cannot watch Link resource: {}", path.display())]
    InvalidPath {
        /// Resource path
        path: PathBuf,
    },

    /// Strategy cannot run on this platform
    #[error("Discovery strategy {strategy} is not supported on this platform")]
    StrategyUnsupported {
        /// Strategy name
        strategy: &'static str,
    },

    /// IO error
    #[error("IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Nix system call error
    #[error("System call error: {source}")]
    Nix {
        /// Source nix error
        #[from]
        source: nix::Error,
    },
}

impl LinkError {
    /// Classify an IO error raised while opening `path`.
    pub fn from_open(path: &std::path::Path, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => LinkError::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => LinkError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => LinkError::Io { source },
        }
    }

    /// True for failures expected while the consumer is creating or removing
    /// the resource: the channel stays closed and watching continues.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LinkError::NotFound { .. } | LinkError::ResourceTooSmall { .. }
        )
    }
}

/// Result type for Link channel operations
pub type LinkResult<T> = Result<T, LinkError>;
