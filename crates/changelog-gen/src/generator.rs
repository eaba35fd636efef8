// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Incremental changelog synthesis
//!
//! One run reads the watermark from the existing document, queries the log
//! for newer commits, filters them, renders a new entry and prepends it:
//!
//! ```text
//! Idle -> WatermarkRead -> LogFetched -> Filtered -> Rendered -> Merged -> Done
//! ```
//!
//! Any step may end the run in `Error`; nothing is retried. Runs against the
//! same document must be serialized by the caller.
//!
//! # Example
//!
//! ```no_run
//! use changelog_gen::generator::{GenerateOptions, generate};
//!
//! let result = generate(&GenerateOptions::new("."));
//! if result.success && result.updated {
//!     println!("Added {} commits", result.commits_count);
//! }
//! ```

use std::path::{Path, PathBuf};

use changelog_git::{CommitRecord, GitRepo, LogSource};
use chrono::Local;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::{EffectiveConfig, load_config};
use crate::document::{backup_document, extract_watermark, merge, read_document, write_atomic};
use crate::error::ChangelogError;
use crate::render::{Renderer, VersionEntry, format_date};
use crate::rules::FilterRules;
use crate::version::detect_version;

/// Message for a run that found nothing after the watermark
pub const NO_NEW_COMMITS: &str = "No new commits";
/// Message for a run whose new commits were all filtered out
pub const NO_QUALIFYING_COMMITS: &str = "No qualifying commits to add to the changelog";
/// Message for a run that wrote a new entry
pub const UPDATED: &str = "Changelog updated";

/// Progress of a synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Nothing done yet
    Idle,
    /// Existing document and watermark read
    WatermarkRead,
    /// Commits after the watermark fetched
    LogFetched,
    /// Filter rules applied
    Filtered,
    /// New entry rendered
    Rendered,
    /// Entry prepended and written
    Merged,
    /// Run finished
    Done,
    /// Run failed
    Error,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A new entry was rendered
    Updated,
    /// No commits after the watermark
    NoNewCommits,
    /// New commits existed but none passed the filters
    NoQualifyingCommits,
}

impl Outcome {
    /// Human-readable description
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Updated => UPDATED,
            Self::NoNewCommits => NO_NEW_COMMITS,
            Self::NoQualifyingCommits => NO_QUALIFYING_COMMITS,
        }
    }
}

/// The in-memory result of the read, fetch, filter and render steps
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// How the run ended
    pub outcome: Outcome,
    /// Commits after the watermark, before filtering
    pub fetched: usize,
    /// The rendered entry, when one was produced
    pub entry: Option<VersionEntry>,
    /// Rendered text of `entry`
    pub section: Option<String>,
    /// Existing document text
    pub prior: Option<String>,
}

impl Synthesis {
    fn skipped(outcome: Outcome, fetched: usize, prior: Option<String>) -> Self {
        Self {
            outcome,
            fetched,
            entry: None,
            section: None,
            prior,
        }
    }

    /// Included commits of the rendered entry
    #[must_use]
    pub fn commits(&self) -> &[CommitRecord] {
        self.entry.as_ref().map_or(&[], |e| e.commits.as_slice())
    }
}

/// Drives a single synthesis run over an injected log source
pub struct Synthesizer<'a> {
    config: &'a EffectiveConfig,
    source: &'a dyn LogSource,
    version: String,
    date: String,
    state: RunState,
}

impl<'a> Synthesizer<'a> {
    /// Create a run for `version`, dated `date`
    #[must_use]
    pub fn new(
        config: &'a EffectiveConfig,
        source: &'a dyn LogSource,
        version: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            config,
            source,
            version: version.into(),
            date: date.into(),
            state: RunState::Idle,
        }
    }

    /// Current state of the run
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "Run state");
        self.state = next;
    }

    /// Record a failed step
    fn check<T, E: Into<ChangelogError>>(&mut self, result: Result<T, E>) -> Result<T, ChangelogError> {
        result.map_err(|e| {
            self.advance(RunState::Error);
            e.into()
        })
    }

    /// Read, fetch, filter and render without touching the document
    ///
    /// # Errors
    ///
    /// Returns `ChangelogError` if the document cannot be read or the log
    /// query fails.
    pub fn synthesize(
        &mut self,
        changelog_path: &Path,
        subpath: Option<&Path>,
        force: bool,
    ) -> Result<Synthesis, ChangelogError> {
        let prior = self.check(read_document(changelog_path))?;
        if prior.is_none() {
            info!(path = %changelog_path.display(), "No changelog yet, including the full history");
        }
        let watermark = extract_watermark(prior.as_deref());
        debug!(watermark = ?watermark, "Read watermark");
        self.advance(RunState::WatermarkRead);

        let commits = self.check(self.source.log_commits(watermark.as_deref(), subpath))?;
        let fetched = commits.len();
        self.advance(RunState::LogFetched);

        if fetched == 0 && !force {
            info!("No new commits, changelog unchanged");
            self.advance(RunState::Done);
            return Ok(Synthesis::skipped(Outcome::NoNewCommits, 0, prior));
        }

        let rules = FilterRules::from_config(&self.config.git);
        let included: Vec<CommitRecord> = commits.into_iter().filter(|c| rules.include(c)).collect();
        debug!(fetched, included = included.len(), "Filtered commits");
        self.advance(RunState::Filtered);

        if included.is_empty() && !force {
            info!(fetched, "All new commits filtered out, changelog unchanged");
            self.advance(RunState::Done);
            return Ok(Synthesis::skipped(
                Outcome::NoQualifyingCommits,
                fetched,
                prior,
            ));
        }

        let last_recorded_id = self.check(self.source.head_id())?;
        let entry = VersionEntry {
            version: self.version.clone(),
            date: self.date.clone(),
            last_recorded_id,
            commits: included,
        };
        let section = Renderer::new(self.config).render(&entry);
        self.advance(RunState::Rendered);

        Ok(Synthesis {
            outcome: Outcome::Updated,
            fetched,
            entry: Some(entry),
            section: Some(section),
            prior,
        })
    }

    /// Prepend the rendered entry and write the document
    ///
    /// Does nothing for a synthesis that produced no entry.
    ///
    /// # Errors
    ///
    /// Returns `ChangelogError::Io` if the backup or the write fails.
    pub fn write(&mut self, changelog_path: &Path, synthesis: &Synthesis) -> Result<(), ChangelogError> {
        let Some(ref section) = synthesis.section else {
            return Ok(());
        };

        if self.config.output.backup_existing {
            self.check(backup_document(changelog_path))?;
        }

        let merged = merge(section, synthesis.prior.as_deref().unwrap_or_default());
        self.check(write_atomic(changelog_path, &merged))?;
        self.advance(RunState::Merged);
        self.advance(RunState::Done);
        Ok(())
    }

    /// Run every step, writing the document when an entry was produced
    ///
    /// # Errors
    ///
    /// See [`Synthesizer::synthesize`] and [`Synthesizer::write`].
    pub fn generate(
        &mut self,
        changelog_path: &Path,
        subpath: Option<&Path>,
        force: bool,
    ) -> Result<GenerateResult, ChangelogError> {
        let synthesis = self.synthesize(changelog_path, subpath, force)?;
        self.write(changelog_path, &synthesis)?;

        let entry = synthesis.entry.as_ref();
        if entry.is_some() {
            info!(
                path = %changelog_path.display(),
                version = %self.version,
                commits = synthesis.commits().len(),
                "Changelog updated"
            );
        }

        Ok(GenerateResult {
            success: true,
            updated: entry.is_some(),
            message: synthesis.outcome.message().to_string(),
            outcome: Some(synthesis.outcome),
            version: Some(self.version.clone()),
            commits_count: synthesis.commits().len(),
            changelog_path: Some(changelog_path.to_path_buf()),
            current_commit_id: entry.map(|e| e.last_recorded_id.clone()),
            new_commits: synthesis.commits().to_vec(),
            state: self.state,
        })
    }

    /// Run the read-only steps and report what would be written
    ///
    /// # Errors
    ///
    /// See [`Synthesizer::synthesize`].
    pub fn preview(
        &mut self,
        changelog_path: &Path,
        subpath: Option<&Path>,
    ) -> Result<PreviewResult, ChangelogError> {
        let synthesis = self.synthesize(changelog_path, subpath, false)?;
        if self.state == RunState::Rendered {
            self.advance(RunState::Done);
        }
        let entry = synthesis.entry.as_ref();

        Ok(PreviewResult {
            success: true,
            has_new_commits: entry.is_some(),
            message: synthesis.outcome.message().to_string(),
            preview_content: synthesis.section.clone(),
            version: Some(self.version.clone()),
            commits_count: synthesis.commits().len(),
            changelog_path: Some(changelog_path.to_path_buf()),
            current_commit_id: entry.map(|e| e.last_recorded_id.clone()),
            new_commits: synthesis.commits().to_vec(),
            state: self.state,
        })
    }
}

/// Options for a top-level run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Project root: config search start, version manifest and document base
    pub project_root: PathBuf,
    /// Write an entry even when nothing new qualifies
    pub force: bool,
    /// Only consider commits touching this path (relative to the project root)
    pub project_path: Option<PathBuf>,
    /// Use this configuration instead of loading one
    pub config: Option<EffectiveConfig>,
}

impl GenerateOptions {
    /// Options for `project_root` with everything else defaulted
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    /// Force a write
    #[must_use]
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Restrict to a subpath
    #[must_use]
    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    /// Use an explicit configuration
    #[must_use]
    pub fn with_config(mut self, config: EffectiveConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// Structured result of `generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    /// False when the run failed
    pub success: bool,
    /// Whether the document was written
    pub updated: bool,
    /// Outcome or failure description
    pub message: String,
    /// How a successful run ended
    pub outcome: Option<Outcome>,
    /// Version recorded in the entry
    pub version: Option<String>,
    /// Number of commits in the new entry
    pub commits_count: usize,
    /// Document path
    pub changelog_path: Option<PathBuf>,
    /// Watermark recorded in the new entry
    pub current_commit_id: Option<String>,
    /// Commits in the new entry
    pub new_commits: Vec<CommitRecord>,
    /// Final run state
    pub state: RunState,
}

impl GenerateResult {
    /// A failed run
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            updated: false,
            message: message.into(),
            outcome: None,
            version: None,
            commits_count: 0,
            changelog_path: None,
            current_commit_id: None,
            new_commits: Vec::new(),
            state: RunState::Error,
        }
    }
}

/// Structured result of `preview`
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResult {
    /// False when the run failed
    pub success: bool,
    /// Whether an entry would be written
    pub has_new_commits: bool,
    /// Outcome or failure description
    pub message: String,
    /// Entry text that would be prepended
    pub preview_content: Option<String>,
    /// Version that would be recorded
    pub version: Option<String>,
    /// Number of commits that would be listed
    pub commits_count: usize,
    /// Document path
    pub changelog_path: Option<PathBuf>,
    /// Watermark that would be recorded
    pub current_commit_id: Option<String>,
    /// Commits that would be listed
    pub new_commits: Vec<CommitRecord>,
    /// Final run state
    pub state: RunState,
}

impl PreviewResult {
    /// A failed preview
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            has_new_commits: false,
            message: message.into(),
            preview_content: None,
            version: None,
            commits_count: 0,
            changelog_path: None,
            current_commit_id: None,
            new_commits: Vec::new(),
            state: RunState::Error,
        }
    }
}

/// Everything a top-level run needs besides the options
struct Prepared {
    repo: GitRepo,
    config: EffectiveConfig,
    version: String,
    date: String,
    changelog_path: PathBuf,
    subpath: Option<PathBuf>,
}

fn prepare(options: &GenerateOptions) -> Result<Prepared, ChangelogError> {
    let root = &options.project_root;
    info!(path = %root.display(), "Working directory");

    let repo = GitRepo::discover(root).map_err(|_| ChangelogError::NotAVersionControlRepository {
        path: root.clone(),
    })?;

    let config = match options.config {
        Some(ref config) => config.clone(),
        None => load_config(root),
    };
    config
        .validate()
        .map_err(|e| ChangelogError::InvalidConfig {
            message: e.to_string(),
        })?;

    let version = detect_version(root, &config.versioning)?;
    let date = format_date(&config.format.date_format, &Local::now().naive_local());
    let changelog_path = config.changelog_path(root);
    let subpath = options
        .project_path
        .as_deref()
        .map(|p| repo_relative(repo.workdir(), root, p));

    if let Some(ref subpath) = subpath {
        info!(subpath = %subpath.display(), "Restricting to project path");
    }

    Ok(Prepared {
        repo,
        config,
        version,
        date,
        changelog_path,
        subpath,
    })
}

/// Express `subpath` (relative to `root`) relative to the repository workdir
fn repo_relative(workdir: Option<&Path>, root: &Path, subpath: &Path) -> PathBuf {
    let absolute = if subpath.is_absolute() {
        subpath.to_path_buf()
    } else {
        root.join(subpath)
    };
    let canonical = |p: &Path| std::fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());

    match workdir {
        Some(workdir) => canonical(&absolute)
            .strip_prefix(canonical(workdir))
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| subpath.to_path_buf()),
        None => subpath.to_path_buf(),
    }
}

/// Generate the changelog for a project
///
/// Never fails: errors are logged and reported as `success: false`.
#[must_use]
pub fn generate(options: &GenerateOptions) -> GenerateResult {
    let result = prepare(options).and_then(|p| {
        Synthesizer::new(&p.config, &p.repo, p.version.clone(), p.date.clone()).generate(
            &p.changelog_path,
            p.subpath.as_deref(),
            options.force,
        )
    });

    result.unwrap_or_else(|e| {
        error!(error = %e, "Changelog generation failed");
        GenerateResult::failure(e.to_string())
    })
}

/// Preview the entry `generate` would write, without writing it
///
/// Never fails: errors are logged and reported as `success: false`.
#[must_use]
pub fn preview(options: &GenerateOptions) -> PreviewResult {
    let result = prepare(options).and_then(|p| {
        Synthesizer::new(&p.config, &p.repo, p.version.clone(), p.date.clone())
            .preview(&p.changelog_path, p.subpath.as_deref())
    });

    result.unwrap_or_else(|e| {
        error!(error = %e, "Changelog preview failed");
        PreviewResult::failure(e.to_string())
    })
}
