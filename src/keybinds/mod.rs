//! Command names and aliases for the interactive shell.
//!
//! Every shell action has a fixed name (`delete`, `paste`, …) and any number of
//! configurable aliases (`rm`, `p`, …). The registry in [`metadata`] is the single
//! source of truth for names, default aliases, usage and help text.

pub mod actions;
pub mod config;
pub mod help;
pub mod metadata;

pub use actions::ExplorerAction;
pub use help::generate_help_text;
pub use config::{KeybindConfig, KeybindDef, KeybindError};
pub use metadata::{ActionCategory, ActionMetadata, ActionRegistry};
