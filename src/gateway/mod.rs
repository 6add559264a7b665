//! Filesystem gateway
//!
//! The boundary between the explorer and the disk. Everything the tree builder and
//! the operation dispatcher do to the filesystem goes through [`FileSystemGateway`],
//! so the same logic runs against the real disk ([`LocalGateway`]) or an in-memory
//! tree with injectable failures ([`MemoryGateway`]).
//!
//! # Move semantics
//!
//! `move_file` and `move_directory` are provided methods composed from copy then
//! delete-source. They are not atomic: when the copy succeeds and the delete fails
//! the data exists in both places and the call returns
//! [`GatewayError::MoveIncomplete`] so the caller can surface it.

pub mod error;
pub mod local;
pub mod memory;

pub use error::{GatewayError, Result};
pub use local::LocalGateway;
pub use memory::{GatewayOp, MemoryGateway};

use async_trait::async_trait;
use std::path::Path;
use tracing::warn;

/// What `stat` reports about a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatInfo {
    /// The path resolves to a directory (following symlinks)
    pub is_directory: bool,
    /// The path itself is a symbolic link
    pub is_symlink: bool,
    /// Size in bytes (0 for directories)
    pub len: u64,
}

impl StatInfo {
    /// Stat result for a regular file of `len` bytes
    #[must_use]
    pub const fn file(len: u64) -> Self {
        Self {
            is_directory: false,
            is_symlink: false,
            len,
        }
    }

    /// Stat result for a directory
    #[must_use]
    pub const fn directory() -> Self {
        Self {
            is_directory: true,
            is_symlink: false,
            len: 0,
        }
    }
}

/// Asynchronous filesystem primitives
///
/// Implementations must be shareable across tasks: the dispatcher spawns each
/// disk operation independently and several may be in flight at once.
#[async_trait]
pub trait FileSystemGateway: Send + Sync {
    /// Entry names (not full paths) of a directory, in listing order
    async fn list_directory(&self, path: &Path) -> Result<Vec<String>>;

    /// Stat a path
    async fn stat(&self, path: &Path) -> Result<StatInfo>;

    /// Read a whole file
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create an empty file; fails if the path already exists
    async fn create_file(&self, path: &Path) -> Result<()>;

    /// Create a directory; succeeds silently if it already exists as a directory
    async fn create_directory(&self, path: &Path) -> Result<()>;

    /// Delete a file; deleting a missing path is an error
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Recursively delete a directory; deleting a missing path is an error
    async fn delete_directory(&self, path: &Path) -> Result<()>;

    /// Copy a single file; fails if the destination exists
    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Recursively copy a directory; fails if the destination exists
    async fn copy_directory(&self, from: &Path, to: &Path) -> Result<()>;

    /// Move a file as copy then delete-source
    async fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.copy_file(from, to).await?;
        self.delete_file(from).await.map_err(|err| incomplete_move(from, to, err))
    }

    /// Move a directory as recursive copy then recursive delete-source
    async fn move_directory(&self, from: &Path, to: &Path) -> Result<()> {
        self.copy_directory(from, to).await?;
        self.delete_directory(from)
            .await
            .map_err(|err| incomplete_move(from, to, err))
    }
}

fn incomplete_move(from: &Path, to: &Path, err: GatewayError) -> GatewayError {
    warn!(
        from = %from.display(),
        to = %to.display(),
        error = %err,
        "move copied data but left the source in place"
    );
    GatewayError::MoveIncomplete {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: Box::new(err),
    }
}
