// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit log queries
//!
//! [`LogSource`] is the capability the synthesis engine consumes: "give me the
//! commits since revision X, optionally restricted to a subpath" as raw log
//! text. [`GitRepo`] implements it on top of `git2`.

use std::fmt::Write as _;
use std::path::Path;

use git2::{DiffOptions, Repository, Sort};
use tracing::debug;

use crate::commit::CommitRecord;
use crate::error::GitError;
use crate::parser::parse_log;

/// A source of commit log text
pub trait LogSource {
    /// Raw log text for the commits after `since` up to HEAD, oldest first
    ///
    /// When `subpath` is given, only commits touching it are listed. The text
    /// uses the four-field record layout understood by [`parse_log`].
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the revision range cannot be walked.
    fn log_since(&self, since: Option<&str>, subpath: Option<&Path>) -> Result<String, GitError>;

    /// Full id of the current HEAD commit
    ///
    /// # Errors
    ///
    /// Returns `GitError` if HEAD cannot be resolved.
    fn head_id(&self) -> Result<String, GitError>;

    /// Query and parse the log in one step
    ///
    /// # Errors
    ///
    /// Propagates errors from [`LogSource::log_since`].
    fn log_commits(
        &self,
        since: Option<&str>,
        subpath: Option<&Path>,
    ) -> Result<Vec<CommitRecord>, GitError> {
        Ok(parse_log(&self.log_since(since, subpath)?))
    }
}

/// A git repository wrapper answering log queries
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Check whether `path` lies inside a git repository
    #[must_use]
    pub fn is_repository(path: impl AsRef<Path>) -> bool {
        Repository::discover(path.as_ref()).is_ok()
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Whether `commit` changes anything under `pathspec`
    ///
    /// A merge counts only when it differs from every parent on the path, as
    /// in `git log -- <path>`. Unlike git's default history simplification,
    /// side branches behind such a merge are still walked.
    fn touches_path(&self, commit: &git2::Commit<'_>, pathspec: &str) -> Result<bool, GitError> {
        let tree = commit.tree()?;

        // Root commits diff against the empty tree
        if commit.parent_count() == 0 {
            return self.differs(None, &tree, pathspec);
        }

        for parent in commit.parents() {
            if !self.differs(Some(&parent.tree()?), &tree, pathspec)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn differs(
        &self,
        old: Option<&git2::Tree<'_>>,
        new: &git2::Tree<'_>,
        pathspec: &str,
    ) -> Result<bool, GitError> {
        let mut opts = DiffOptions::new();
        opts.pathspec(pathspec);

        let diff = self.repo.diff_tree_to_tree(old, Some(new), Some(&mut opts))?;
        Ok(diff.deltas().next().is_some())
    }

    fn write_record(&self, out: &mut String, commit: &git2::Commit<'_>) -> Result<(), GitError> {
        let short = commit.as_object().short_id()?;
        // Writing into a String cannot fail
        let _ = writeln!(out, "{}", commit.id());
        let _ = writeln!(out, "{}", short.as_str().unwrap_or_default());
        let _ = writeln!(out, "{}", commit.summary().unwrap_or_default());
        if let Some(body) = commit.body() {
            let _ = writeln!(out, "{}", body.trim_end());
        }
        Ok(())
    }
}

impl LogSource for GitRepo {
    fn log_since(&self, since: Option<&str>, subpath: Option<&Path>) -> Result<String, GitError> {
        let range = since.map_or_else(|| "HEAD".to_string(), |s| format!("{s}..HEAD"));
        let query_failed = |e: git2::Error| GitError::LogQuery {
            range: range.clone(),
            detail: e.message().to_string(),
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        revwalk.push_head().map_err(query_failed)?;

        if let Some(since) = since {
            let oid = self
                .repo
                .revparse_single(since)
                .and_then(|obj| obj.peel_to_commit())
                .map_err(|_| GitError::InvalidReference {
                    reference: since.to_string(),
                })?
                .id();
            revwalk.hide(oid).map_err(query_failed)?;
        }

        let pathspec = subpath.and_then(normalize_pathspec);

        let mut out = String::new();
        let mut listed = 0usize;
        for oid in revwalk {
            let commit = self.repo.find_commit(oid.map_err(query_failed)?)?;
            if let Some(ref filter) = pathspec
                && !self.touches_path(&commit, filter)?
            {
                continue;
            }
            self.write_record(&mut out, &commit)?;
            listed += 1;
        }

        debug!(range = %range, subpath = ?pathspec, commits = listed, "Queried commit log");
        Ok(out)
    }

    fn head_id(&self) -> Result<String, GitError> {
        let head = self.repo.head()?;
        let oid = head.target().ok_or_else(|| GitError::InvalidReference {
            reference: "HEAD".to_string(),
        })?;
        Ok(oid.to_string())
    }
}

/// Turn a user-supplied subpath into a git pathspec, `None` for the whole tree
fn normalize_pathspec(path: &Path) -> Option<String> {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./").trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        None
    } else {
        Some(trimmed.to_string())
    }
}
