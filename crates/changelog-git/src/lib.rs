// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! changelog-git: Git log querying and parsing for changelog-gen
//!
//! This library crate turns the raw, multi-record commit log of a repository
//! into structured [`CommitRecord`] values for the changelog synthesis engine.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use changelog_git::{GitRepo, LogSource};
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let commits = repo.log_commits(None, None).expect("query log");
//!
//! for c in commits {
//!     println!("{} - {}", c.short_id, c.subject);
//! }
//! ```

pub mod commit;
pub mod error;
pub mod parser;
pub mod source;

pub use commit::CommitRecord;
pub use error::GitError;
pub use parser::{parse_log, parse_log_bytes};
pub use source::{GitRepo, LogSource};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::CommitRecord;
    pub use crate::error::GitError;
    pub use crate::parser::parse_log;
    pub use crate::source::{GitRepo, LogSource};
}
