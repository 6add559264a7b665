//! UI abstraction layer
//!
//! The explorer core never talks to a terminal directly. It asks a [`Dialog`]
//! for paths (the "open" and "save" pickers) and reports through an
//! [`OutputWriter`]. Both are traits so the interactive shell can use dialoguer
//! prompts and colored stdout while tests script the answers and capture the
//! messages.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │  ExplorerSession / commands   │
//! └──────────────┬────────────────┘
//!                │ uses traits
//!                ▼
//! ┌───────────────────────────────┐
//! │   Dialog      OutputWriter    │
//! └──────┬───────────────┬────────┘
//!        ▼               ▼
//!  PromptDialog     StdoutWriter
//!  MockDialog       BufferedWriter
//! ```

mod error;

pub mod dialog;
pub mod mock;
pub mod output;

pub use dialog::{Dialog, PromptDialog};
pub use error::{Result, UiError};
pub use mock::MockDialog;
pub use output::{BufferedWriter, MessageLevel, OutputWriter, StdoutWriter};
