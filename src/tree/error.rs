//! Tree building errors

use crate::gateway::GatewayError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole tree build
#[derive(Debug, Error)]
pub enum TreeError {
    /// No root could be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: GatewayError,
    },

    /// The walk was cancelled before it finished
    #[error("Directory walk was cancelled")]
    Cancelled,
}
