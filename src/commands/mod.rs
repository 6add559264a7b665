//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and runs the operation through the filesystem gateway.

pub mod export;
pub mod search;
pub mod shell;
pub mod tree;

// Re-export execute functions for convenience
pub use export::execute as export;
pub use search::execute as search;
pub use shell::execute as shell;
pub use tree::execute as tree;

use crate::config::ExplorerConfig;
use crate::gateway::FileSystemGateway;
use crate::output::{TreeStyle, format_failures};
use crate::tree::BuildFailure;
use crate::ui::OutputWriter;
use std::sync::Arc;

/// Everything a command needs besides its own arguments
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub gateway: &'a Arc<dyn FileSystemGateway>,
    pub config: &'a ExplorerConfig,
    pub style: TreeStyle,
    pub output: &'a dyn OutputWriter,
}

impl CommandContext<'_> {
    /// Print unreadable branches as warnings
    pub(crate) fn warn_failures(&self, failures: &[BuildFailure]) {
        for line in format_failures(failures, self.style.path_format) {
            self.output.warning(&line);
        }
    }
}
