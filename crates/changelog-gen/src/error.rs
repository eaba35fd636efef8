// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for changelog-gen

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors of a changelog run
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// The project is not inside a git repository
    #[error("Not a git repository: {path}")]
    NotAVersionControlRepository {
        /// The project root that was searched
        path: PathBuf,
    },

    /// No version manifest was found
    #[error("Version source not found: {path}")]
    MissingVersionSource {
        /// The manifest path that was expected
        path: PathBuf,
    },

    /// The version manifest has no version field
    #[error("No version field in {path}")]
    MissingVersionField {
        /// The manifest that was read
        path: PathBuf,
    },

    /// The existing changelog has no recognizable version header
    #[error("No version header found in {path}")]
    DocumentFormatUnrecognized {
        /// The changelog that was read
        path: PathBuf,
    },

    /// The commit log query failed
    #[error("Git log query failed: {0}")]
    LogQueryFailure(#[from] changelog_git::GitError),

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration
        message: String,
    },

    /// Error reading or writing a file
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file being accessed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Error parsing a JSON manifest
    #[error("JSON parse error in {path}: {source}")]
    Json {
        /// The file being parsed
        path: PathBuf,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// Error parsing a TOML manifest
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        /// The file being parsed
        path: PathBuf,
        /// Underlying parse error
        source: toml::de::Error,
    },
}

impl ChangelogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
