//! Action metadata registry - single source of truth for shell commands

use crate::keybinds::actions::ExplorerAction;
use crate::keybinds::config::KeybindConfig;

/// Metadata for a shell action
#[derive(Debug, Clone)]
pub struct ActionMetadata {
    /// Action enum variant
    pub action: ExplorerAction,

    /// Fixed command name (e.g., "delete")
    pub id: &'static str,

    /// Aliases used when the config does not set any
    pub default_aliases: &'static [&'static str],

    /// Argument synopsis (e.g., "<row> <folder-row>")
    pub usage: &'static str,

    /// Full description
    pub description: &'static str,

    /// Category for grouping in help
    pub category: ActionCategory,
}

/// Category for organizing actions in help displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    /// Opening and displaying trees
    Browse,
    /// Search configuration and execution
    Search,
    /// Selection and export
    Selection,
    /// Create, delete, copy, move
    FileOperations,
    /// Help, status, quit
    System,
}

impl ActionMetadata {
    /// Configured aliases, falling back to the defaults
    ///
    /// An action disabled with `"none"` has no aliases; its name still works.
    #[must_use]
    pub fn aliases(&self, config: &KeybindConfig) -> Vec<String> {
        if config.is_disabled(self.id) {
            return Vec::new();
        }
        let configured = config.get(self.id);
        if configured.is_empty() {
            self.default_aliases.iter().map(|s| (*s).to_string()).collect()
        } else {
            configured.into_iter().filter(|a| a != "none").collect()
        }
    }

    /// Name and aliases as shown in help (e.g., "delete (rm, del)")
    #[must_use]
    pub fn display_name(&self, config: &KeybindConfig) -> String {
        let aliases = self.aliases(config);
        if aliases.is_empty() {
            self.id.to_string()
        } else {
            format!("{} ({})", self.id, aliases.join(", "))
        }
    }
}

/// Global registry of all action metadata
pub struct ActionRegistry;

impl ActionRegistry {
    /// Get all registered actions
    #[must_use]
    pub const fn all() -> &'static [ActionMetadata] {
        ALL_ACTIONS
    }

    /// Get metadata for a specific action
    #[must_use]
    pub fn get(action: ExplorerAction) -> Option<&'static ActionMetadata> {
        ALL_ACTIONS.iter().find(|m| m.action == action)
    }

    /// Get metadata by command name
    #[must_use]
    pub fn get_by_id(id: &str) -> Option<&'static ActionMetadata> {
        ALL_ACTIONS.iter().find(|m| m.id == id)
    }

    /// Get actions by category
    #[must_use]
    pub fn by_category(category: ActionCategory) -> Vec<&'static ActionMetadata> {
        ALL_ACTIONS
            .iter()
            .filter(|m| m.category == category)
            .collect()
    }

    /// Resolve a typed word to an action by name or alias
    #[must_use]
    pub fn resolve(word: &str, config: &KeybindConfig) -> Option<ExplorerAction> {
        let word = word.to_lowercase();
        ALL_ACTIONS
            .iter()
            .find(|m| m.id == word)
            .or_else(|| {
                ALL_ACTIONS
                    .iter()
                    .find(|m| m.aliases(config).iter().any(|a| *a == word))
            })
            .map(|m| m.action)
    }
}

/// Static registry - compile-time constant with all action metadata
static ALL_ACTIONS: &[ActionMetadata] = &[
    // Browse
    ActionMetadata {
        action: ExplorerAction::Open,
        id: "open",
        default_aliases: &["o"],
        usage: "[path…]",
        description: "Open directories or files (asks when no path is given)",
        category: ActionCategory::Browse,
    },
    ActionMetadata {
        action: ExplorerAction::Show,
        id: "tree",
        default_aliases: &["ls"],
        usage: "",
        description: "Print the tree",
        category: ActionCategory::Browse,
    },
    ActionMetadata {
        action: ExplorerAction::Expand,
        id: "expand",
        default_aliases: &["+"],
        usage: "<row>",
        description: "Show a folder's contents",
        category: ActionCategory::Browse,
    },
    ActionMetadata {
        action: ExplorerAction::Collapse,
        id: "collapse",
        default_aliases: &["-"],
        usage: "<row>",
        description: "Hide a folder's contents",
        category: ActionCategory::Browse,
    },
    ActionMetadata {
        action: ExplorerAction::Refresh,
        id: "refresh",
        default_aliases: &["r"],
        usage: "",
        description: "Rebuild the tree from disk",
        category: ActionCategory::Browse,
    },
    ActionMetadata {
        action: ExplorerAction::Reveal,
        id: "reveal",
        default_aliases: &[],
        usage: "<row>",
        description: "Show an entry in the system file manager",
        category: ActionCategory::Browse,
    },
    // Search
    ActionMetadata {
        action: ExplorerAction::Search,
        id: "search",
        default_aliases: &["s", "find"],
        usage: "<query>",
        description: "Search the search area with the active criteria",
        category: ActionCategory::Search,
    },
    ActionMetadata {
        action: ExplorerAction::Criteria,
        id: "criteria",
        default_aliases: &[],
        usage: "[name] [ext] [content]",
        description: "Choose the active search criteria (no argument shows them)",
        category: ActionCategory::Search,
    },
    ActionMetadata {
        action: ExplorerAction::Area,
        id: "area",
        default_aliases: &[],
        usage: "[path…]",
        description: "Set the search area (defaults to the opened roots)",
        category: ActionCategory::Search,
    },
    // Selection
    ActionMetadata {
        action: ExplorerAction::Select,
        id: "select",
        default_aliases: &["sel"],
        usage: "<row>",
        description: "Select an entry (a folder selects its whole subtree)",
        category: ActionCategory::Selection,
    },
    ActionMetadata {
        action: ExplorerAction::Deselect,
        id: "deselect",
        default_aliases: &["desel"],
        usage: "<row>",
        description: "Clear an entry's selection",
        category: ActionCategory::Selection,
    },
    ActionMetadata {
        action: ExplorerAction::Toggle,
        id: "toggle",
        default_aliases: &["t"],
        usage: "<row>",
        description: "Flip an entry's selection",
        category: ActionCategory::Selection,
    },
    ActionMetadata {
        action: ExplorerAction::Export,
        id: "export",
        default_aliases: &["x"],
        usage: "[dest]",
        description: "Copy the selection into a folder (asks when no folder is given)",
        category: ActionCategory::Selection,
    },
    // File operations
    ActionMetadata {
        action: ExplorerAction::New,
        id: "new",
        default_aliases: &["mk"],
        usage: "<file|folder> <folder-row> <name>",
        description: "Create a file or folder",
        category: ActionCategory::FileOperations,
    },
    ActionMetadata {
        action: ExplorerAction::Delete,
        id: "delete",
        default_aliases: &["rm", "del"],
        usage: "<row>",
        description: "Delete an entry and everything below it",
        category: ActionCategory::FileOperations,
    },
    ActionMetadata {
        action: ExplorerAction::Copy,
        id: "copy",
        default_aliases: &["cp"],
        usage: "<row>",
        description: "Copy an entry to the clipboard",
        category: ActionCategory::FileOperations,
    },
    ActionMetadata {
        action: ExplorerAction::Cut,
        id: "cut",
        default_aliases: &[],
        usage: "<row>",
        description: "Cut an entry to the clipboard",
        category: ActionCategory::FileOperations,
    },
    ActionMetadata {
        action: ExplorerAction::Paste,
        id: "paste",
        default_aliases: &["p"],
        usage: "<folder-row>",
        description: "Paste the clipboard entry into a folder",
        category: ActionCategory::FileOperations,
    },
    ActionMetadata {
        action: ExplorerAction::Drag,
        id: "move",
        default_aliases: &["mv", "drag"],
        usage: "<row> <folder-row>",
        description: "Move an entry into a folder",
        category: ActionCategory::FileOperations,
    },
    // System
    ActionMetadata {
        action: ExplorerAction::Status,
        id: "status",
        default_aliases: &["st"],
        usage: "",
        description: "Show pending disk operations and the clipboard",
        category: ActionCategory::System,
    },
    ActionMetadata {
        action: ExplorerAction::Help,
        id: "help",
        default_aliases: &["?", "h"],
        usage: "",
        description: "Show this help",
        category: ActionCategory::System,
    },
    ActionMetadata {
        action: ExplorerAction::Quit,
        id: "quit",
        default_aliases: &["q", "exit"],
        usage: "",
        description: "Leave the shell",
        category: ActionCategory::System,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybinds::config::KeybindDef;
    use std::collections::HashMap;

    #[test]
    fn test_every_action_registered_once() {
        let ids: Vec<_> = ALL_ACTIONS.iter().map(|m| m.id).collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len(), "Duplicate action IDs found in registry");

        let actions: std::collections::HashSet<_> = ALL_ACTIONS.iter().map(|m| m.action).collect();
        assert_eq!(actions.len(), ALL_ACTIONS.len());
    }

    #[test]
    fn test_resolve_by_name_and_alias() {
        let config = KeybindConfig::default();
        assert_eq!(ActionRegistry::resolve("delete", &config), Some(ExplorerAction::Delete));
        assert_eq!(ActionRegistry::resolve("RM", &config), Some(ExplorerAction::Delete));
        assert_eq!(ActionRegistry::resolve("mv", &config), Some(ExplorerAction::Drag));
        assert_eq!(ActionRegistry::resolve("nope", &config), None);
    }

    #[test]
    fn test_configured_aliases_replace_defaults() {
        let mut keybinds = HashMap::new();
        keybinds.insert(
            "delete".to_string(),
            KeybindDef::Multiple(vec!["kill".to_string()]),
        );
        let config = KeybindConfig { keybinds };

        assert_eq!(ActionRegistry::resolve("kill", &config), Some(ExplorerAction::Delete));
        assert_eq!(ActionRegistry::resolve("rm", &config), None);
        assert_eq!(ActionRegistry::resolve("delete", &config), Some(ExplorerAction::Delete));
    }

    #[test]
    fn test_disabled_action_keeps_name() {
        let mut keybinds = HashMap::new();
        keybinds.insert("quit".to_string(), KeybindDef::Single("none".to_string()));
        let config = KeybindConfig { keybinds };

        assert_eq!(ActionRegistry::resolve("q", &config), None);
        assert_eq!(ActionRegistry::resolve("quit", &config), Some(ExplorerAction::Quit));
        let meta = ActionRegistry::get(ExplorerAction::Quit).unwrap();
        assert_eq!(meta.display_name(&config), "quit");
    }
}
