//! Output formatting for CLI display
//!
//! Tree rendering, path display formatting and JSON output. Colors go through
//! `colored`, so `colored::control::set_override(false)` turns them off globally.

use crate::config::{DisplayConfig, PathFormat};
use crate::model::{TreeModel, ViewIndex};
use crate::tree::{BuildFailure, FileNode};
use colored::Colorize;
use std::path::Path;

/// Format a path according to the display mode
#[must_use]
pub fn format_path(path: &Path, format: PathFormat) -> String {
    match format {
        PathFormat::Absolute => path.display().to_string(),
        PathFormat::Relative => {
            if let Ok(cwd) = std::env::current_dir()
                && let Ok(rel_path) = path.strip_prefix(&cwd)
                && !rel_path.as_os_str().is_empty()
            {
                return rel_path.display().to_string();
            }
            // Fallback to absolute if relative path cannot be computed
            path.display().to_string()
        }
    }
}

/// Layout settings for tree rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStyle {
    /// Spaces per depth level
    pub indent_width: usize,
    /// How root paths are shown
    pub path_format: PathFormat,
    /// Prefix every line with its row number
    pub numbered: bool,
}

impl Default for TreeStyle {
    fn default() -> Self {
        Self {
            indent_width: 2,
            path_format: PathFormat::Absolute,
            numbered: false,
        }
    }
}

impl From<&DisplayConfig> for TreeStyle {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            indent_width: display.indent_width,
            path_format: display.path_format,
            numbered: false,
        }
    }
}

impl TreeStyle {
    /// Same style with row numbers switched on or off
    #[must_use]
    pub const fn numbered(mut self, numbered: bool) -> Self {
        self.numbered = numbered;
        self
    }
}

/// Render the visible rows of a model
///
/// Each line is `indent marker checkbox label`. Folders show `▾` (expanded) or
/// `▸` (collapsed); the checkbox is `[x]` for a selected entry and `[-]` for one
/// covered by a selected ancestor. Roots are labelled with their path, everything
/// else with its name.
#[must_use]
pub fn render_model(model: &TreeModel, style: TreeStyle) -> String {
    render_view(model, &model.view(), style)
}

/// Render rows of a precomputed view
#[must_use]
pub fn render_view(model: &TreeModel, view: &ViewIndex, style: TreeStyle) -> String {
    let width = view.len().to_string().len();
    let mut out = String::new();

    for (index, row) in view.rows().iter().enumerate() {
        let Some(node) = model.get(row.id) else {
            continue;
        };

        if style.numbered {
            out.push_str(&format!("{:>width$} ", index + 1).dimmed().to_string());
        }
        out.push_str(&" ".repeat(row.depth * style.indent_width));

        let marker = match (node.is_folder(), node.expanded) {
            (true, true) => "▾",
            (true, false) => "▸",
            (false, _) => " ",
        };
        let implied = node
            .parent
            .is_some_and(|parent| model.is_ancestor_or_self_selected(parent));
        let checkbox = if node.selected {
            "[x]".green().to_string()
        } else if implied {
            "[-]".green().to_string()
        } else {
            "[ ]".to_string()
        };

        let label = if row.depth == 0 {
            format_path(&node.path, style.path_format)
        } else {
            node.name.clone()
        };
        let label = if node.is_folder() {
            format!("{label}/").blue().bold().to_string()
        } else {
            label
        };

        out.push_str(&format!("{marker} {checkbox} {label}\n"));
    }
    out
}

/// Render [`FileNode`] trees with every folder expanded
#[must_use]
pub fn render_nodes(nodes: &[FileNode], style: TreeStyle) -> String {
    render_model(&TreeModel::from_nodes(nodes.to_vec()), style)
}

/// Serialize trees as pretty JSON
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// One line per unreadable branch of a build
#[must_use]
pub fn format_failures(failures: &[BuildFailure], format: PathFormat) -> Vec<String> {
    failures
        .iter()
        .map(|failure| {
            format!(
                "could not read {}: {}",
                format_path(&failure.path, format),
                failure.error
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_nodes_indents_by_depth() {
        plain();
        let nodes = vec![
            FileNode::folder("/root/docs", vec![FileNode::file("/root/docs/x.txt")]),
            FileNode::file("/root/notes.txt"),
        ];
        let rendered = render_nodes(&nodes, TreeStyle::default());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "▾ [ ] /root/docs/");
        assert_eq!(lines[1], "    [ ] x.txt");
        assert_eq!(lines[2], "  [ ] /root/notes.txt");
    }

    #[test]
    fn test_render_marks_selection_and_collapse() {
        plain();
        let mut docs = FileNode::folder("/r/docs", vec![FileNode::file("/r/docs/x.txt")]);
        docs.selected = true;
        let mut model = TreeModel::from_nodes(vec![docs, FileNode::folder("/r/empty", vec![])]);
        let empty = model.roots()[1];
        model.set_expanded(empty, false);

        let rendered = render_model(&model, TreeStyle::default().numbered(true));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "1 ▾ [x] /r/docs/");
        assert_eq!(lines[1], "2     [-] x.txt");
        assert_eq!(lines[2], "3 ▸ [ ] /r/empty/");
    }

    #[test]
    fn test_format_path_absolute() {
        assert_eq!(format_path(Path::new("/a/b"), PathFormat::Absolute), "/a/b");
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&[FileNode::file("/a.txt")]).unwrap();
        assert!(json.contains("\"kind\": \"file\""));
        assert!(!json.contains("children"));
    }
}
