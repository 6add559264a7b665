//! Scripted dialog for tests

use super::dialog::Dialog;
use super::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Dialog that returns predetermined answers
///
/// Useful for driving a session without user interaction
#[derive(Debug, Clone, Default)]
pub struct MockDialog {
    /// Answer to the open picker; `None` simulates cancel
    pub open: Option<Vec<PathBuf>>,
    /// Answer to the save picker; `None` simulates cancel
    pub save: Option<PathBuf>,
}

impl MockDialog {
    /// A dialog that cancels every picker
    #[must_use]
    pub fn cancelled() -> Self {
        Self::default()
    }

    /// A dialog whose open picker returns `paths`
    #[must_use]
    pub fn opening<P: Into<PathBuf>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            open: Some(paths.into_iter().map(Into::into).collect()),
            save: None,
        }
    }

    /// Set the save picker's answer
    #[must_use]
    pub fn saving_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save = Some(path.into());
        self
    }
}

#[async_trait]
impl Dialog for MockDialog {
    async fn pick_directory_or_files(&self) -> Result<Option<Vec<PathBuf>>> {
        Ok(self.open.clone())
    }

    async fn pick_save_destination(&self) -> Result<Option<PathBuf>> {
        Ok(self.save.clone())
    }
}
