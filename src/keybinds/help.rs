//! Help text generation from action metadata

use crate::keybinds::config::KeybindConfig;
use crate::keybinds::metadata::{ActionCategory, ActionRegistry};

/// Generate the shell's help screen based on configured aliases
#[must_use]
pub fn generate_help_text(config: &KeybindConfig) -> String {
    let mut output = String::new();

    output.push_str("fsx shell - commands\n");
    output.push_str("Rows are the numbers printed by `tree`.\n\n");

    for category in [
        ActionCategory::Browse,
        ActionCategory::Search,
        ActionCategory::Selection,
        ActionCategory::FileOperations,
        ActionCategory::System,
    ] {
        output.push_str(&format!("{}:\n", category_name(category)));
        for meta in ActionRegistry::by_category(category) {
            let synopsis = if meta.usage.is_empty() {
                meta.display_name(config)
            } else {
                format!("{} {}", meta.display_name(config), meta.usage)
            };
            output.push_str(&format!("  {synopsis:<44}{}\n", meta.description));
        }
        output.push('\n');
    }

    output
}

/// Get category display name
const fn category_name(category: ActionCategory) -> &'static str {
    match category {
        ActionCategory::Browse => "BROWSE",
        ActionCategory::Search => "SEARCH",
        ActionCategory::Selection => "SELECTION & EXPORT",
        ActionCategory::FileOperations => "FILE OPERATIONS",
        ActionCategory::System => "SYSTEM",
    }
}
