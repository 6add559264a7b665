//! Single-slot clipboard for copy/cut/paste

use super::NodeId;

/// What the next paste does with the clipboard node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Holds at most one node and one mode; a new copy or cut replaces it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clipboard {
    slot: Option<(NodeId, ClipboardMode)>,
}

impl Clipboard {
    #[must_use]
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Replace the clipboard contents
    pub fn set(&mut self, id: NodeId, mode: ClipboardMode) {
        self.slot = Some((id, mode));
    }

    #[must_use]
    pub const fn peek(&self) -> Option<(NodeId, ClipboardMode)> {
        self.slot
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
