//! Action types for the interactive shell.

/// Actions the shell can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplorerAction {
    /// Open directories or files as the displayed roots
    Open,
    /// Print the tree
    Show,
    /// Run a search over the search area
    Search,
    /// Choose which search criteria are active
    Criteria,
    /// Set the search area to the given paths (or the current roots)
    Area,
    /// Mark an entry selected
    Select,
    /// Clear an entry's selection
    Deselect,
    /// Flip an entry's selection
    Toggle,
    /// Show a folder's contents
    Expand,
    /// Hide a folder's contents
    Collapse,
    /// Create a file or folder
    New,
    /// Delete an entry
    Delete,
    /// Put an entry on the clipboard for copying
    Copy,
    /// Put an entry on the clipboard for moving
    Cut,
    /// Paste the clipboard entry into a folder
    Paste,
    /// Move an entry into a folder
    Drag,
    /// Copy the selection to a destination folder
    Export,
    /// Show an entry in the system file manager
    Reveal,
    /// Rebuild the tree from disk
    Refresh,
    /// Show pending operations and the clipboard
    Status,
    /// Show help
    Help,
    /// Leave the shell
    Quit,
}

impl ExplorerAction {
    /// Returns whether this action operates on a tree row.
    #[must_use]
    pub const fn requires_target(self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::Deselect
                | Self::Toggle
                | Self::Expand
                | Self::Collapse
                | Self::New
                | Self::Delete
                | Self::Copy
                | Self::Cut
                | Self::Paste
                | Self::Drag
                | Self::Reveal
        )
    }

    /// Returns whether this action changes files on disk.
    #[must_use]
    pub const fn mutates_disk(self) -> bool {
        matches!(
            self,
            Self::New | Self::Delete | Self::Paste | Self::Drag | Self::Export
        )
    }
}
