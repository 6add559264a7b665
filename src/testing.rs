//! Testing utilities for fsx
//!
//! This module provides an on-disk fixture, [`TestTree`], for tests that need a
//! real directory tree behind a [`LocalGateway`].
//!
//! Only available when compiled with `cfg(test)`.

use crate::gateway::{FileSystemGateway, LocalGateway};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary directory tree that is removed on drop
///
/// Paths given to the helpers are relative to [`TestTree::root`].
///
/// # Examples
/// ```ignore
/// let tree = TestTree::new();
/// tree.file("docs/readme.md", "hello");
/// assert!(tree.path("docs").is_dir());
/// ```
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create an empty tree
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temporary directory"),
        }
    }

    /// A small project layout:
    ///
    /// ```text
    /// docs/guide.md      "# Guide\nTODO: write"
    /// docs/img/logo.png  "png"
    /// src/main.rs        "fn main() {}"
    /// notes.txt          "remember the milk"
    /// ```
    #[must_use]
    pub fn sample() -> Self {
        let tree = Self::new();
        tree.file("docs/guide.md", "# Guide\nTODO: write");
        tree.file("docs/img/logo.png", "png");
        tree.file("src/main.rs", "fn main() {}");
        tree.file("notes.txt", "remember the milk");
        tree
    }

    /// Absolute path of the tree's root folder
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the tree
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file, creating parent folders as needed
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn file(&self, relative: impl AsRef<Path>, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent folders");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Create a folder and its parents
    ///
    /// # Panics
    /// Panics if the folder cannot be created.
    pub fn dir(&self, relative: impl AsRef<Path>) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("Failed to create test folder");
        path
    }

    /// Content of a file, or `None` if it cannot be read
    #[must_use]
    pub fn read(&self, relative: impl AsRef<Path>) -> Option<String> {
        fs::read_to_string(self.path(relative)).ok()
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Gateway over the real disk, typed the way sessions and builders take it
#[must_use]
pub fn local_gateway() -> Arc<dyn FileSystemGateway> {
    Arc::new(LocalGateway::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    #[test]
    fn test_sample_layout() {
        let tree = TestTree::sample();
        assert!(tree.path("docs/img").is_dir());
        assert_eq!(tree.read("notes.txt").as_deref(), Some("remember the milk"));
    }

    #[test]
    fn test_cleanup_on_drop() {
        let root = {
            let tree = TestTree::new();
            tree.dir("a/b");
            tree.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_builder_over_sample() {
        let tree = TestTree::sample();
        let built = TreeBuilder::new(local_gateway())
            .build(&[tree.root().to_path_buf()])
            .await
            .unwrap();

        assert_eq!(built.nodes.len(), 1);
        // root, docs, guide.md, img, logo.png, src, main.rs, notes.txt
        assert_eq!(built.nodes[0].count(), 8);
        assert!(built.failures.is_empty());
    }
}
