// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Changelog configuration
//!
//! The user's `changelog-config.json` is merged recursively over the built-in
//! defaults: objects merge key by key, while scalars and arrays replace the
//! default outright. The result is an immutable [`EffectiveConfig`] built once
//! per run. Unknown keys are ignored.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Configuration file name searched for from the project root upwards
pub const CONFIG_FILE_NAME: &str = "changelog-config.json";

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectiveConfig {
    /// Output document settings
    pub changelog: ChangelogConfig,
    /// Templates and separators
    pub format: FormatConfig,
    /// Commit selection settings
    pub git: GitConfig,
    /// Version discovery settings
    pub versioning: VersioningConfig,
    /// Write behaviour
    pub output: OutputConfig,
    /// Keyword-based grouping
    pub custom_sections: CustomSectionsConfig,
}

/// `changelog` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangelogConfig {
    /// Document file name
    pub filename: String,
    /// Directory of the document, relative to the project root
    pub output_path: String,
    /// Text encoding of the document
    pub encoding: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            filename: "CHANGELOG.md".to_string(),
            output_path: "./".to_string(),
            encoding: "utf8".to_string(),
        }
    }
}

/// `format` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatConfig {
    /// Date pattern using `YYYY`, `MM`, `DD`, `HH`, `mm`, `ss`
    pub date_format: String,
    /// Version header, with `{version}` and `{date}`
    pub header_template: String,
    /// Commit line, with `{message}`, `{subject}`, `{hash}`, `{fullHash}`, `{shortHash}`
    pub commit_template: String,
    /// Category heading for grouped output, with `{title}`
    pub section_template: String,
    /// Separator between blocks of an entry, and after the entry
    pub section_separator: String,
    /// Separator between commit lines
    pub commit_separator: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date_format: "YYYY-MM-DD".to_string(),
            header_template: "## [{version}] - {date}".to_string(),
            commit_template: "- {message} ({hash})".to_string(),
            section_template: "### {title}".to_string(),
            section_separator: "\n\n".to_string(),
            commit_separator: "\n".to_string(),
        }
    }
}

/// `git` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitConfig {
    /// Truncate the full id to `hash_length` for `{hash}`
    pub include_hash: bool,
    /// Length of `{hash}`; `null` falls back to the short id
    pub hash_length: Option<usize>,
    /// Keep commits whose message mentions "merge"
    pub include_merge_commits: bool,
    /// Exclude and include patterns
    pub commit_message_filters: MessageFilters,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            include_hash: true,
            hash_length: Some(7),
            include_merge_commits: false,
            commit_message_filters: MessageFilters::default(),
        }
    }
}

/// `git.commitMessageFilters` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageFilters {
    /// Patterns that reject a commit
    pub exclude: Vec<String>,
    /// Patterns of which at least one must match, when non-empty
    pub include: Vec<String>,
}

impl Default for MessageFilters {
    fn default() -> Self {
        Self {
            exclude: ["^Merge", "^merge", "^Update", "^update"]
                .map(String::from)
                .to_vec(),
            include: Vec::new(),
        }
    }
}

/// `versioning` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersioningConfig {
    /// Read the version from a manifest instead of using the fallback
    pub auto_detect_version: bool,
    /// Manifest file name, or `auto` for `Cargo.toml` then `package.json`
    pub version_source: String,
    /// Version used when detection is disabled
    pub fallback_version: String,
    /// Prefix placed before the version in headers
    pub version_prefix: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            auto_detect_version: true,
            version_source: "auto".to_string(),
            fallback_version: "1.0.0".to_string(),
            version_prefix: String::new(),
        }
    }
}

/// `output` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    /// Copy the previous document to `<file>.bak` before writing
    pub backup_existing: bool,
}

/// `customSections` group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSectionsConfig {
    /// Group commits under category headings
    pub enabled: bool,
    /// Heading for commits no section claims
    pub other_title: String,
    /// Categories in priority order
    pub sections: Vec<SectionConfig>,
}

impl Default for CustomSectionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            other_title: "Other Changes".to_string(),
            sections: Vec::new(),
        }
    }
}

/// One configured category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Heading text
    pub title: String,
    /// Whole-word keywords that claim a commit
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SectionConfig {
    /// A category with its keywords
    #[must_use]
    pub fn new(title: &str, keywords: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config {0}: {1}")]
    Io(PathBuf, std::io::Error),

    /// The file is not valid JSON or has values of the wrong type
    #[error("Failed to parse config {0}: {1}")]
    Parse(PathBuf, serde_json::Error),

    /// The file parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl EffectiveConfig {
    /// The default configuration plus the sample categories (disabled)
    ///
    /// This is what `init` writes to disk.
    #[must_use]
    pub fn sample() -> Self {
        let mut config = Self::default();
        config.custom_sections.sections = vec![
            SectionConfig::new("Features", &["feat", "feature", "add"]),
            SectionConfig::new("Bug Fixes", &["fix", "bug", "patch"]),
            SectionConfig::new("Documentation", &["docs", "doc", "readme"]),
            SectionConfig::new("Styling", &["style", "format", "ui"]),
            SectionConfig::new("Refactoring", &["refactor", "refact"]),
            SectionConfig::new("Performance", &["perf", "performance"]),
            SectionConfig::new("Tests", &["test", "spec"]),
            SectionConfig::new("Build", &["build", "ci", "deploy"]),
        ];
        config
    }

    /// Merge a user JSON document over the defaults
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if a merged value has the wrong type.
    pub fn from_user_value(user: Value) -> Result<Self, serde_json::Error> {
        let defaults = serde_json::to_value(Self::default())?;
        serde_json::from_value(merge_values(defaults, user))
    }

    /// Read and merge a configuration file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let user: Value =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        let config =
            Self::from_user_value(user).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the type system cannot
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.changelog.filename.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "changelog.filename must not be empty".to_string(),
            ));
        }
        if self.git.hash_length == Some(0) {
            return Err(ConfigError::Invalid(
                "git.hashLength must be at least 1".to_string(),
            ));
        }
        if self
            .custom_sections
            .sections
            .iter()
            .any(|s| s.title.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "customSections.sections entries need a title".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether grouped rendering applies
    #[must_use]
    pub fn grouping_enabled(&self) -> bool {
        self.custom_sections.enabled && !self.custom_sections.sections.is_empty()
    }

    /// Full path of the changelog document under `project_root`
    #[must_use]
    pub fn changelog_path(&self, project_root: &Path) -> PathBuf {
        let dir: PathBuf = Path::new(&self.changelog.output_path)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        project_root.join(dir).join(&self.changelog.filename)
    }
}

/// Recursively merge `user` over `base`
///
/// Objects merge key by key; any other user value replaces the base value.
#[must_use]
pub fn merge_values(base: Value, user: Value) -> Value {
    match (base, user) {
        (Value::Object(mut base), Value::Object(user)) => {
            for (key, value) in user {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, user) => user,
    }
}

/// Find the nearest config file from `start` upwards
#[must_use]
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load the effective configuration for a project
///
/// A missing file means defaults. A file that fails to parse is reported as a
/// warning and the defaults are used instead.
#[must_use]
pub fn load_config(project_root: &Path) -> EffectiveConfig {
    let Some(path) = find_config_file(project_root) else {
        info!("No config file found, using defaults");
        return EffectiveConfig::default();
    };

    match EffectiveConfig::from_file(&path) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded config file");
            if !matches!(
                config.changelog.encoding.to_ascii_lowercase().as_str(),
                "utf8" | "utf-8"
            ) {
                warn!(
                    encoding = %config.changelog.encoding,
                    "Only UTF-8 documents are supported, writing UTF-8"
                );
            }
            config
        }
        Err(e) => {
            warn!(error = %e, "Config file unusable, falling back to defaults");
            EffectiveConfig::default()
        }
    }
}
