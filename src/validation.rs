//! User-input validation errors
//!
//! These are raised at the point of a user action, before any I/O is attempted,
//! so a rejected command never leaves partial work behind.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected user input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Search was started with an empty query
    #[error("Enter a search query")]
    EmptyQuery,

    /// Search was started with every criterion switched off
    #[error("Choose at least one of: file name, extension, content")]
    NoCriteria,

    /// A new entry needs a name
    #[error("Enter a name for the new entry")]
    EmptyName,

    /// A new entry needs a kind (file or folder)
    #[error("Choose whether to create a file or a folder")]
    NoKind,

    /// Names cannot contain path separators or be `.`/`..`
    #[error("Invalid name: '{0}'")]
    InvalidName(String),

    /// The parent already has an entry with this name
    #[error("'{0}' already exists here")]
    AlreadyExists(String),

    /// The operation needs a folder as its target
    #[error("Not a folder: {}", .0.display())]
    NotAFolder(PathBuf),

    /// A folder cannot be copied or moved into its own subtree
    #[error("Cannot put {} inside itself", .0.display())]
    IntoItself(PathBuf),

    /// The referenced node is not in the tree (anymore)
    #[error("No such entry in the tree")]
    UnknownNode,

    /// Paste without a prior copy or cut
    #[error("Nothing to paste: copy or cut an entry first")]
    EmptyClipboard,

    /// Export without any selected entries
    #[error("Nothing selected to export")]
    NothingSelected,
}

/// Check a user-entered entry name
///
/// # Errors
///
/// Returns `ValidationError::EmptyName` for blank input and
/// `ValidationError::InvalidName` for names containing separators or `.`/`..`.
pub fn check_entry_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name == "." || name == ".." || name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(name)
}
