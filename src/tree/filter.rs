//! Search predicates applied during a tree walk
//!
//! A search combines up to three independent criteria:
//!
//! - **Name**: case-insensitive substring of the query, with the query's extension
//!   stripped, against the candidate's full name.
//! - **Extension**: case-insensitive substring of the query's extension (or the whole
//!   query when it has none) against the candidate's extension.
//! - **Content**: case-insensitive substring of the whole query in the file's text.
//!
//! Every enabled criterion must pass for a file. Folders are only ever tested
//! against the name criterion; see [`TreeBuilder`](super::TreeBuilder) for how
//! non-matching folders collapse.

use crate::gateway::FileSystemGateway;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// What to search for and how
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Match the query against entry names
    #[serde(default)]
    pub match_name: bool,
    /// Match the query's extension against file extensions
    #[serde(default)]
    pub match_extension: bool,
    /// Match the query against file contents
    #[serde(default)]
    pub match_content: bool,
    /// The search text
    #[serde(default)]
    pub query: String,
}

impl SearchCriteria {
    /// Criteria with only name matching enabled
    #[must_use]
    pub fn name(query: impl Into<String>) -> Self {
        Self {
            match_name: true,
            query: query.into(),
            ..Self::default()
        }
    }

    /// Criteria with only extension matching enabled
    #[must_use]
    pub fn extension(query: impl Into<String>) -> Self {
        Self {
            match_extension: true,
            query: query.into(),
            ..Self::default()
        }
    }

    /// Criteria with only content matching enabled
    #[must_use]
    pub fn content(query: impl Into<String>) -> Self {
        Self {
            match_content: true,
            query: query.into(),
            ..Self::default()
        }
    }

    /// Check that the search can run
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyQuery` if the query is blank and
    /// `ValidationError::NoCriteria` if no criterion is enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        if !(self.match_name || self.match_extension || self.match_content) {
            return Err(ValidationError::NoCriteria);
        }
        Ok(())
    }
}

/// Split `name` into `(stem, extension)` at the last dot.
///
/// A leading dot belongs to the extension (`.pdf` → `("", "pdf")`); a trailing dot
/// yields no extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Compiled search predicate
#[derive(Debug, Clone)]
pub struct SearchFilter {
    criteria: SearchCriteria,
    name_needle: String,
    extension_needle: String,
    content_needle: String,
    max_content_bytes: u64,
}

impl SearchFilter {
    /// Validate the criteria and prepare the lower-cased needles
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the criteria cannot run a search.
    pub fn new(criteria: SearchCriteria) -> Result<Self, ValidationError> {
        criteria.validate()?;

        let query = criteria.query.trim().to_lowercase();
        let (stem, extension) = split_extension(&query);
        let name_needle = stem.to_string();
        let extension_needle = extension.unwrap_or(query.as_str()).to_string();

        Ok(Self {
            name_needle,
            extension_needle,
            content_needle: query.clone(),
            max_content_bytes: u64::MAX,
            criteria,
        })
    }

    /// Skip content matching for files larger than `bytes`
    #[must_use]
    pub const fn with_max_content_bytes(mut self, bytes: u64) -> Self {
        self.max_content_bytes = bytes;
        self
    }

    /// The criteria this filter was built from
    #[must_use]
    pub const fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// Whether the name criterion is enabled
    #[must_use]
    pub const fn uses_name(&self) -> bool {
        self.criteria.match_name
    }

    /// Whether matching a file requires reading it
    #[must_use]
    pub const fn needs_content(&self) -> bool {
        self.criteria.match_content
    }

    /// Name criterion alone
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.name_needle)
    }

    /// Extension criterion alone
    #[must_use]
    pub fn matches_extension(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        split_extension(&name)
            .1
            .is_some_and(|ext| ext.contains(&self.extension_needle))
    }

    /// Synchronous criteria for a candidate entry
    ///
    /// Folders pass only when the name criterion is enabled and matches. Files must
    /// pass every enabled name/extension criterion; content is checked separately
    /// with [`matches_content`](Self::matches_content).
    #[must_use]
    pub fn matches(&self, name: &str, is_folder: bool) -> bool {
        if is_folder {
            return self.criteria.match_name && self.matches_name(name);
        }
        self.matches_file(name, false)
    }

    /// File check with the name criterion optionally waived
    ///
    /// `name_satisfied` is set for files below a folder that already matched by name.
    #[must_use]
    pub fn matches_file(&self, name: &str, name_satisfied: bool) -> bool {
        if self.criteria.match_name && !name_satisfied && !self.matches_name(name) {
            return false;
        }
        if self.criteria.match_extension && !self.matches_extension(name) {
            return false;
        }
        true
    }

    /// Content criterion
    ///
    /// Reads the whole file through the gateway. Unreadable or oversized files do not
    /// match; they never fail the search.
    pub async fn matches_content(&self, gateway: &dyn FileSystemGateway, path: &Path, len: u64) -> bool {
        if len > self.max_content_bytes {
            debug!(path = %path.display(), len, "skipping content match for large file");
            return false;
        }
        match gateway.read_file(path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes)
                .to_lowercase()
                .contains(&self.content_needle),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "content match failed closed");
                false
            }
        }
    }
}
