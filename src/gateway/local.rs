//! Real-disk gateway backed by `tokio::fs`

use super::error::{GatewayError, Result};
use super::{FileSystemGateway, StatInfo};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Gateway over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGateway;

impl LocalGateway {
    /// Create a new local gateway
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| GatewayError::from_io(path, e))
}

async fn ensure_absent(path: &Path) -> Result<()> {
    if exists(path).await? {
        return Err(GatewayError::AlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(unix)]
async fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let target = fs::read_link(from)
        .await
        .map_err(|e| GatewayError::from_io(from, e))?;
    fs::symlink(&target, to)
        .await
        .map_err(|e| GatewayError::from_io(to, e))
}

#[cfg(not(unix))]
async fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|e| GatewayError::from_io(from, e))
}

#[cfg(windows)]
async fn unlink_dir_symlink(path: &Path) -> Result<()> {
    fs::remove_dir(path)
        .await
        .map_err(|e| GatewayError::from_io(path, e))
}

#[cfg(not(windows))]
async fn unlink_dir_symlink(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .await
        .map_err(|e| GatewayError::from_io(path, e))
}

#[async_trait]
impl FileSystemGateway for LocalGateway {
    async fn list_directory(&self, path: &Path) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(path)
            .await
            .map_err(|e| GatewayError::from_io(path, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GatewayError::from_io(path, e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn stat(&self, path: &Path) -> Result<StatInfo> {
        let link_meta = fs::symlink_metadata(path)
            .await
            .map_err(|e| GatewayError::from_io(path, e))?;

        if !link_meta.file_type().is_symlink() {
            return Ok(StatInfo {
                is_directory: link_meta.is_dir(),
                is_symlink: false,
                len: if link_meta.is_dir() { 0 } else { link_meta.len() },
            });
        }

        // Dangling links stat as empty files rather than failing the walk
        match fs::metadata(path).await {
            Ok(target) => Ok(StatInfo {
                is_directory: target.is_dir(),
                is_symlink: true,
                len: if target.is_dir() { 0 } else { target.len() },
            }),
            Err(_) => Ok(StatInfo {
                is_directory: false,
                is_symlink: true,
                len: 0,
            }),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(|e| GatewayError::from_io(path, e))
    }

    async fn create_file(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "creating file");
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::from_io(path, e))
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "creating directory");
        match fs::create_dir(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if self.stat(path).await?.is_directory {
                    Ok(())
                } else {
                    Err(GatewayError::AlreadyExists(path.to_path_buf()))
                }
            }
            Err(e) => Err(GatewayError::from_io(path, e)),
        }
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "deleting file");
        let meta = fs::symlink_metadata(path)
            .await
            .map_err(|e| GatewayError::from_io(path, e))?;
        if meta.is_dir() {
            return Err(GatewayError::IsADirectory(path.to_path_buf()));
        }
        fs::remove_file(path)
            .await
            .map_err(|e| GatewayError::from_io(path, e))
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "deleting directory");
        let meta = fs::symlink_metadata(path)
            .await
            .map_err(|e| GatewayError::from_io(path, e))?;
        // A link to a folder walks as a folder; only the link is removed
        if meta.file_type().is_symlink() {
            if !self.stat(path).await?.is_directory {
                return Err(GatewayError::NotADirectory(path.to_path_buf()));
            }
            return unlink_dir_symlink(path).await;
        }
        if !meta.is_dir() {
            return Err(GatewayError::NotADirectory(path.to_path_buf()));
        }
        fs::remove_dir_all(path)
            .await
            .map_err(|e| GatewayError::from_io(path, e))
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        debug!(from = %from.display(), to = %to.display(), "copying file");
        if self.stat(from).await?.is_directory {
            return Err(GatewayError::IsADirectory(from.to_path_buf()));
        }
        ensure_absent(to).await?;
        fs::copy(from, to)
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::from_io(from, e))
    }

    async fn copy_directory(&self, from: &Path, to: &Path) -> Result<()> {
        debug!(from = %from.display(), to = %to.display(), "copying directory");
        if !self.stat(from).await?.is_directory {
            return Err(GatewayError::NotADirectory(from.to_path_buf()));
        }
        if to.starts_with(from) {
            return Err(GatewayError::InvalidTarget {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            });
        }
        ensure_absent(to).await?;

        let mut pending: Vec<(PathBuf, PathBuf)> = vec![(from.to_path_buf(), to.to_path_buf())];
        while let Some((src_dir, dst_dir)) = pending.pop() {
            fs::create_dir(&dst_dir)
                .await
                .map_err(|e| GatewayError::from_io(&dst_dir, e))?;

            let mut entries = fs::read_dir(&src_dir)
                .await
                .map_err(|e| GatewayError::from_io(&src_dir, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| GatewayError::from_io(&src_dir, e))?
            {
                let src = entry.path();
                let dst = dst_dir.join(entry.file_name());
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| GatewayError::from_io(&src, e))?;

                if file_type.is_dir() {
                    pending.push((src, dst));
                } else if file_type.is_symlink() {
                    copy_symlink(&src, &dst).await?;
                } else {
                    fs::copy(&src, &dst)
                        .await
                        .map_err(|e| GatewayError::from_io(&src, e))?;
                }
            }
        }
        Ok(())
    }
}
