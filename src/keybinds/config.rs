//! Configuration for shell command aliases.

use crate::keybinds::metadata::ActionRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Alias configuration: action name → alias or aliases
///
/// ```toml
/// [keybinds]
/// delete = ["rm", "del"]
/// paste = "p"
/// quit = "none"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeybindConfig {
    /// Alias mappings; actions not listed keep their default aliases
    #[serde(default, flatten)]
    pub keybinds: HashMap<String, KeybindDef>,
}

/// Alias definition - single alias, multiple aliases, or `"none"`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeybindDef {
    /// Single alias
    Single(String),
    /// Multiple alternative aliases for the same action
    Multiple(Vec<String>),
}

/// Invalid alias configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeybindError {
    /// An entry names an action that does not exist
    #[error("keybind configured for unknown action '{0}'")]
    UnknownAction(String),

    /// One alias was given to two actions
    #[error("alias '{alias}' is configured for both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
}

impl KeybindConfig {
    /// Get the configured alias(es) for an action name.
    ///
    /// Returns an empty list if the action is not configured.
    #[must_use]
    pub fn get(&self, action: &str) -> Vec<String> {
        self.keybinds
            .get(action)
            .map_or_else(Vec::new, |def| match def {
                KeybindDef::Single(alias) => vec![alias.to_lowercase()],
                KeybindDef::Multiple(aliases) => aliases.iter().map(|a| a.to_lowercase()).collect(),
            })
    }

    /// Check if aliases are disabled for an action.
    #[must_use]
    pub fn is_disabled(&self, action: &str) -> bool {
        self.keybinds.get(action).is_some_and(|def| match def {
            KeybindDef::Single(alias) => alias == "none",
            KeybindDef::Multiple(aliases) => aliases.iter().all(|a| a == "none"),
        })
    }

    /// Check every entry against the action registry
    ///
    /// # Errors
    ///
    /// Returns `KeybindError::UnknownAction` for an entry whose key is not an action
    /// name, and `KeybindError::DuplicateAlias` when two actions share an alias.
    pub fn validate(&self) -> Result<(), KeybindError> {
        let mut unknown: Vec<&String> = self
            .keybinds
            .keys()
            .filter(|name| ActionRegistry::get_by_id(name).is_none())
            .collect();
        unknown.sort();
        if let Some(name) = unknown.first() {
            return Err(KeybindError::UnknownAction((*name).clone()));
        }

        let mut owners: HashMap<String, &str> = HashMap::new();
        for meta in ActionRegistry::all() {
            for alias in meta.aliases(self) {
                if let Some(first) = owners.insert(alias.clone(), meta.id) {
                    return Err(KeybindError::DuplicateAlias {
                        alias,
                        first: first.to_string(),
                        second: meta.id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
