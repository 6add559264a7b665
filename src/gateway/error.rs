//! Filesystem gateway error types
//!
//! Every primitive in [`FileSystemGateway`](super::FileSystemGateway) fails with a
//! [`GatewayError`]. The variants keep the offending path so that reports can name
//! the entry the user acted on, not just the underlying OS message.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by filesystem primitives
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The path (or a required parent) does not exist
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The OS refused access to the path
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The target of a create or copy already exists
    #[error("Path already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// A directory operation was given a file
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A file operation was given a directory
    #[error("Is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// A directory cannot be copied or moved into its own subtree
    #[error("Cannot copy {} into its own subtree at {}", from.display(), to.display())]
    InvalidTarget { from: PathBuf, to: PathBuf },

    /// Move copied the data but could not remove the source; both now exist
    #[error("Copied {} to {} but could not remove the source: {source}", from.display(), to.display())]
    MoveIncomplete {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: Box<GatewayError>,
    },

    /// Any other I/O failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for gateway primitives
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Classify an `io::Error` raised while touching `path`
    #[must_use]
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path the failure is attributed to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path)
            | Self::PermissionDenied(path)
            | Self::AlreadyExists(path)
            | Self::NotADirectory(path)
            | Self::IsADirectory(path)
            | Self::Io { path, .. } => path,
            Self::InvalidTarget { from, .. } | Self::MoveIncomplete { from, .. } => from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let path = Path::new("/tmp/x");

        let err = GatewayError::from_io(path, io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(err, GatewayError::NotFound(ref p) if p == path));

        let err = GatewayError::from_io(path, io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(matches!(err, GatewayError::PermissionDenied(_)));

        let err = GatewayError::from_io(path, io::Error::new(io::ErrorKind::AlreadyExists, "dup"));
        assert!(matches!(err, GatewayError::AlreadyExists(_)));

        let err = GatewayError::from_io(path, io::Error::other("disk on fire"));
        assert!(matches!(err, GatewayError::Io { .. }));
    }

    #[test]
    fn test_move_incomplete_names_both_paths() {
        let err = GatewayError::MoveIncomplete {
            from: PathBuf::from("/a/b.txt"),
            to: PathBuf::from("/c/b.txt"),
            source: Box::new(GatewayError::PermissionDenied(PathBuf::from("/a/b.txt"))),
        };
        let message = err.to_string();
        assert!(message.contains("/a/b.txt"));
        assert!(message.contains("/c/b.txt"));
        assert_eq!(err.path(), Path::new("/a/b.txt"));
    }
}
