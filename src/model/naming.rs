//! Collision policy for pasted, moved and exported entries

use crate::tree::NodeKind;

/// Pick a name for `name` that is not in `taken`
///
/// Returns `name` unchanged when it is free. Otherwise appends ` (1)`, ` (2)`, …
/// before a file's extension (`b.txt` → `b (1).txt`) or after a folder's name.
#[must_use]
pub fn unique_name<S: AsRef<str>>(name: &str, kind: NodeKind, taken: &[S]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|t| t.as_ref() == candidate);
    if !is_taken(name) {
        return name.to_string();
    }

    let (stem, extension) = match kind {
        NodeKind::File => match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        },
        NodeKind::Folder => (name, None),
    };

    (1..)
        .map(|n| match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        })
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_name_unchanged() {
        assert_eq!(unique_name("b.txt", NodeKind::File, &["a.txt"]), "b.txt");
    }

    #[test]
    fn test_file_suffix_before_extension() {
        assert_eq!(unique_name("b.txt", NodeKind::File, &["b.txt"]), "b (1).txt");
        assert_eq!(
            unique_name("b.txt", NodeKind::File, &["b.txt", "b (1).txt"]),
            "b (2).txt"
        );
    }

    #[test]
    fn test_folder_and_dotfile_suffix_at_end() {
        assert_eq!(unique_name("my.dir", NodeKind::Folder, &["my.dir"]), "my.dir (1)");
        assert_eq!(unique_name(".env", NodeKind::File, &[".env"]), ".env (1)");
    }
}
