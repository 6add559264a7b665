//! fsx - an asynchronous file explorer and search tool
//!
//! Builds file trees from disk (optionally filtered by name, extension or
//! content), keeps an in-memory tree model in step with the disk while the user
//! creates, deletes, copies and moves entries, and exports a selected subset to
//! another folder.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod gateway;
pub mod keybinds;
pub mod model;
pub mod output;
pub mod selection;
pub mod session;
pub mod tree;
pub mod ui;
pub mod validation;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Rejected user input
    #[error("{0}")]
    Validation(#[from] validation::ValidationError),
    /// Filesystem primitive failure
    #[error("Filesystem error: {0}")]
    Gateway(#[from] gateway::GatewayError),
    /// Tree build failure
    #[error("{0}")]
    Tree(#[from] tree::TreeError),
    /// Dialog failure
    #[error("UI error: {0}")]
    Ui(#[from] ui::UiError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// JSON output failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
