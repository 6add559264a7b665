//! UI error types

use thiserror::Error;

/// Errors raised by the dialog collaborator
#[derive(Debug, Error)]
pub enum UiError {
    /// The prompt could not be shown or read
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// The prompt task was interrupted before the user answered
    #[error("UI operation was interrupted")]
    Interrupted,

    /// IO error during UI operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for UiError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

/// Result type for UI operations
pub type Result<T> = std::result::Result<T, UiError>;
