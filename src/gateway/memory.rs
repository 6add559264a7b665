//! In-memory gateway for tests and demos
//!
//! Holds a small filesystem in a `HashMap` keyed by absolute path. Directory
//! listings keep insertion order, so walks over it are deterministic. Failures and
//! per-path latency can be injected to exercise partial-failure and out-of-order
//! completion paths without touching the disk.

use super::error::{GatewayError, Result};
use super::{FileSystemGateway, StatInfo};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Primitive kinds, used to target injected failures and to inspect the call log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    List,
    Stat,
    Read,
    CreateFile,
    CreateDirectory,
    DeleteFile,
    DeleteDirectory,
    CopyFile,
    CopyDirectory,
}

#[derive(Debug, Clone)]
enum MemEntry {
    File(Vec<u8>),
    Dir(Vec<String>),
}

#[derive(Debug, Default)]
struct MemState {
    entries: HashMap<PathBuf, MemEntry>,
    failures: HashSet<(GatewayOp, PathBuf)>,
    delays: HashMap<PathBuf, Duration>,
    log: Vec<(GatewayOp, PathBuf)>,
}

impl MemState {
    fn add_child(&mut self, path: &Path, entry: MemEntry) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| GatewayError::AlreadyExists(path.to_path_buf()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| GatewayError::NotFound(path.to_path_buf()))?;

        match self.entries.get_mut(parent) {
            Some(MemEntry::Dir(children)) => children.push(name),
            Some(MemEntry::File(_)) => return Err(GatewayError::NotADirectory(parent.to_path_buf())),
            None => return Err(GatewayError::NotFound(parent.to_path_buf())),
        }
        self.entries.insert(path.to_path_buf(), entry);
        Ok(())
    }

    fn detach(&mut self, path: &Path) {
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let name = name.to_string_lossy();
            if let Some(MemEntry::Dir(children)) = self.entries.get_mut(parent) {
                children.retain(|child| *child != name);
            }
        }
    }

    /// Pre-order list of `(path, entry)` for the subtree rooted at `root`
    fn subtree(&self, root: &Path) -> Vec<(PathBuf, MemEntry)> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(path) = stack.pop() {
            if let Some(entry) = self.entries.get(&path) {
                if let MemEntry::Dir(children) = entry {
                    for child in children.iter().rev() {
                        stack.push(path.join(child));
                    }
                }
                out.push((path, entry.clone()));
            }
        }
        out
    }
}

/// In-memory [`FileSystemGateway`]
#[derive(Debug)]
pub struct MemoryGateway {
    state: Mutex<MemState>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// Create a gateway containing only the root directory `/`
    #[must_use]
    pub fn new() -> Self {
        let mut state = MemState::default();
        state
            .entries
            .insert(PathBuf::from("/"), MemEntry::Dir(Vec::new()));
        Self {
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_dirs(state: &mut MemState, path: &Path) {
        let mut missing = Vec::new();
        let mut cursor = Some(path);
        while let Some(current) = cursor {
            if state.entries.contains_key(current) {
                break;
            }
            missing.push(current.to_path_buf());
            cursor = current.parent();
        }
        for dir in missing.into_iter().rev() {
            let _ = state.add_child(&dir, MemEntry::Dir(Vec::new()));
        }
    }

    /// Add a directory, creating missing ancestors
    #[must_use]
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        Self::ensure_dirs(&mut self.state(), path.as_ref());
        self
    }

    /// Add a file with content, creating missing ancestors
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        let path = path.as_ref();
        {
            let mut state = self.state();
            if let Some(parent) = path.parent() {
                Self::ensure_dirs(&mut state, parent);
            }
            if state.entries.contains_key(path) {
                state
                    .entries
                    .insert(path.to_path_buf(), MemEntry::File(content.as_ref().to_vec()));
            } else {
                let _ = state.add_child(path, MemEntry::File(content.as_ref().to_vec()));
            }
        }
        self
    }

    /// Make every `op` touching `path` fail
    pub fn fail_on(&self, op: GatewayOp, path: impl AsRef<Path>) {
        self.state().failures.insert((op, path.as_ref().to_path_buf()));
    }

    /// Remove a previously injected failure
    pub fn clear_failure(&self, op: GatewayOp, path: impl AsRef<Path>) {
        self.state().failures.remove(&(op, path.as_ref().to_path_buf()));
    }

    /// Delay every primitive touching `path` by `delay`
    #[must_use]
    pub fn with_delay(self, path: impl AsRef<Path>, delay: Duration) -> Self {
        self.state().delays.insert(path.as_ref().to_path_buf(), delay);
        self
    }

    /// Whether `path` exists
    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.state().entries.contains_key(path.as_ref())
    }

    /// Whether `path` exists and is a directory
    #[must_use]
    pub fn is_dir(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.state().entries.get(path.as_ref()), Some(MemEntry::Dir(_)))
    }

    /// Entry names of a directory, in listing order
    #[must_use]
    pub fn children(&self, path: impl AsRef<Path>) -> Option<Vec<String>> {
        match self.state().entries.get(path.as_ref()) {
            Some(MemEntry::Dir(children)) => Some(children.clone()),
            _ => None,
        }
    }

    /// File content as a lossy string
    #[must_use]
    pub fn read_string(&self, path: impl AsRef<Path>) -> Option<String> {
        match self.state().entries.get(path.as_ref()) {
            Some(MemEntry::File(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// Every primitive called so far, with the primary path it was called on
    #[must_use]
    pub fn operations(&self) -> Vec<(GatewayOp, PathBuf)> {
        self.state().log.clone()
    }

    /// Record the call, wait for any injected latency, then check for an injected failure
    async fn enter(&self, op: GatewayOp, paths: &[&Path]) -> Result<()> {
        let delay = {
            let mut state = self.state();
            if let Some(first) = paths.first() {
                state.log.push((op, first.to_path_buf()));
            }
            paths
                .iter()
                .filter_map(|p| state.delays.get(*p).copied())
                .max()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        for path in paths {
            if state.failures.contains(&(op, path.to_path_buf())) {
                return Err(GatewayError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::other(format!("injected {op:?} failure")),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystemGateway for MemoryGateway {
    async fn list_directory(&self, path: &Path) -> Result<Vec<String>> {
        self.enter(GatewayOp::List, &[path]).await?;
        match self.state().entries.get(path) {
            Some(MemEntry::Dir(children)) => Ok(children.clone()),
            Some(MemEntry::File(_)) => Err(GatewayError::NotADirectory(path.to_path_buf())),
            None => Err(GatewayError::NotFound(path.to_path_buf())),
        }
    }

    async fn stat(&self, path: &Path) -> Result<StatInfo> {
        self.enter(GatewayOp::Stat, &[path]).await?;
        match self.state().entries.get(path) {
            Some(MemEntry::Dir(_)) => Ok(StatInfo::directory()),
            Some(MemEntry::File(bytes)) => Ok(StatInfo::file(bytes.len() as u64)),
            None => Err(GatewayError::NotFound(path.to_path_buf())),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.enter(GatewayOp::Read, &[path]).await?;
        match self.state().entries.get(path) {
            Some(MemEntry::File(bytes)) => Ok(bytes.clone()),
            Some(MemEntry::Dir(_)) => Err(GatewayError::IsADirectory(path.to_path_buf())),
            None => Err(GatewayError::NotFound(path.to_path_buf())),
        }
    }

    async fn create_file(&self, path: &Path) -> Result<()> {
        self.enter(GatewayOp::CreateFile, &[path]).await?;
        let mut state = self.state();
        if state.entries.contains_key(path) {
            return Err(GatewayError::AlreadyExists(path.to_path_buf()));
        }
        state.add_child(path, MemEntry::File(Vec::new()))
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        self.enter(GatewayOp::CreateDirectory, &[path]).await?;
        let mut state = self.state();
        match state.entries.get(path) {
            Some(MemEntry::Dir(_)) => Ok(()),
            Some(MemEntry::File(_)) => Err(GatewayError::AlreadyExists(path.to_path_buf())),
            None => state.add_child(path, MemEntry::Dir(Vec::new())),
        }
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        self.enter(GatewayOp::DeleteFile, &[path]).await?;
        let mut state = self.state();
        match state.entries.get(path) {
            Some(MemEntry::File(_)) => {
                state.entries.remove(path);
                state.detach(path);
                Ok(())
            }
            Some(MemEntry::Dir(_)) => Err(GatewayError::IsADirectory(path.to_path_buf())),
            None => Err(GatewayError::NotFound(path.to_path_buf())),
        }
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        self.enter(GatewayOp::DeleteDirectory, &[path]).await?;
        let mut state = self.state();
        match state.entries.get(path) {
            Some(MemEntry::Dir(_)) => {
                state.entries.retain(|entry, _| !entry.starts_with(path));
                state.detach(path);
                Ok(())
            }
            Some(MemEntry::File(_)) => Err(GatewayError::NotADirectory(path.to_path_buf())),
            None => Err(GatewayError::NotFound(path.to_path_buf())),
        }
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.enter(GatewayOp::CopyFile, &[from, to]).await?;
        let mut state = self.state();
        let bytes = match state.entries.get(from) {
            Some(MemEntry::File(bytes)) => bytes.clone(),
            Some(MemEntry::Dir(_)) => return Err(GatewayError::IsADirectory(from.to_path_buf())),
            None => return Err(GatewayError::NotFound(from.to_path_buf())),
        };
        if state.entries.contains_key(to) {
            return Err(GatewayError::AlreadyExists(to.to_path_buf()));
        }
        state.add_child(to, MemEntry::File(bytes))
    }

    async fn copy_directory(&self, from: &Path, to: &Path) -> Result<()> {
        self.enter(GatewayOp::CopyDirectory, &[from, to]).await?;
        let mut state = self.state();
        match state.entries.get(from) {
            Some(MemEntry::Dir(_)) => {}
            Some(MemEntry::File(_)) => return Err(GatewayError::NotADirectory(from.to_path_buf())),
            None => return Err(GatewayError::NotFound(from.to_path_buf())),
        }
        if to.starts_with(from) {
            return Err(GatewayError::InvalidTarget {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            });
        }
        if state.entries.contains_key(to) {
            return Err(GatewayError::AlreadyExists(to.to_path_buf()));
        }

        for (path, entry) in state.subtree(from) {
            let relative = path.strip_prefix(from).unwrap_or(&path);
            let target = if relative.as_os_str().is_empty() {
                to.to_path_buf()
            } else {
                to.join(relative)
            };
            let entry = match entry {
                MemEntry::Dir(_) => MemEntry::Dir(Vec::new()),
                file @ MemEntry::File(_) => file,
            };
            state.add_child(&target, entry)?;
        }
        Ok(())
    }
}
