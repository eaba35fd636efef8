//! Commit record type

use serde::{Deserialize, Serialize};

/// A single commit as reported by the log query
///
/// Records are produced by the log parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The full commit id (40 hex characters)
    pub full_id: String,
    /// Abbreviated commit id
    pub short_id: String,
    /// First line of the commit message
    pub subject: String,
    /// Remaining non-blank message lines joined with `\n` (may be empty)
    pub body: String,
}

impl CommitRecord {
    /// Create a record from its four fields
    #[must_use]
    pub fn new(
        full_id: impl Into<String>,
        short_id: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            full_id: full_id.into(),
            short_id: short_id.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Validate that an id is a full 40-character hex string
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        id.len() == 40 && id.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// The full commit message: the subject, then the body on following lines
    #[must_use]
    pub fn message(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n{}", self.subject, self.body)
        }
    }

    /// The full id truncated to `len` characters
    #[must_use]
    pub fn abbreviated_id(&self, len: usize) -> &str {
        match self.full_id.char_indices().nth(len) {
            Some((idx, _)) => &self.full_id[..idx],
            None => &self.full_id,
        }
    }
}
