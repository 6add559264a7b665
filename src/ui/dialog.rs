//! Open/save pickers
//!
//! A [`Dialog`] answers two questions: which paths to open, and where to export.
//! `None` (or an empty list) means the user cancelled.

use super::error::{Result, UiError};
use async_trait::async_trait;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use std::path::PathBuf;

/// Picker collaborator
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Ask for one or more directories or files to open
    ///
    /// # Errors
    ///
    /// Returns a `UiError` if the prompt cannot be shown or read.
    async fn pick_directory_or_files(&self) -> Result<Option<Vec<PathBuf>>>;

    /// Ask for the folder to export the selection into
    ///
    /// # Errors
    ///
    /// Returns a `UiError` if the prompt cannot be shown or read.
    async fn pick_save_destination(&self) -> Result<Option<PathBuf>>;
}

/// Split a line of user input into paths
///
/// Paths are separated by whitespace; wrap a path in double quotes to keep its
/// spaces.
#[must_use]
pub fn parse_paths(line: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }
    paths
}

/// Terminal pickers backed by `dialoguer`
///
/// dialoguer blocks on the terminal, so every prompt runs on Tokio's blocking
/// pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptDialog;

impl PromptDialog {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn prompt(prompt: &'static str) -> Result<String> {
        tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(UiError::from)
        })
        .await
        .map_err(|_| UiError::Interrupted)?
    }
}

#[async_trait]
impl Dialog for PromptDialog {
    async fn pick_directory_or_files(&self) -> Result<Option<Vec<PathBuf>>> {
        let line = Self::prompt("Paths to open (empty to cancel)").await?;
        let paths = parse_paths(&line);
        Ok((!paths.is_empty()).then_some(paths))
    }

    async fn pick_save_destination(&self) -> Result<Option<PathBuf>> {
        let line = Self::prompt("Export to folder (empty to cancel)").await?;
        Ok(parse_paths(&line).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!(
            parse_paths("  /a /b/c.txt "),
            vec![PathBuf::from("/a"), PathBuf::from("/b/c.txt")]
        );
        assert_eq!(
            parse_paths(r#""/my docs" /x"#),
            vec![PathBuf::from("/my docs"), PathBuf::from("/x")]
        );
        assert!(parse_paths("   ").is_empty());
    }
}
