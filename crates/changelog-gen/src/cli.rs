// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command-line interface for changelog-gen
//!
//! Running without a subcommand generates the changelog, so
//! `changelog-gen --preview` and `changelog-gen generate --preview` are the
//! same thing.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use crate::config::{CONFIG_FILE_NAME, find_config_file, load_config};
use crate::document::{LatestFormat, LatestView, format_latest, latest_entry, read_document};
use crate::generator::{GenerateOptions, generate, preview};
use crate::init::{check_config, init_config};

/// Incremental changelog generation from git history
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "changelog-gen")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run (defaults to generate)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Generate options when no subcommand is given
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs and output decoration
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

/// Options of the generate command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Project root (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Write a new entry even when no commits qualify
    #[arg(short, long)]
    pub force: bool,

    /// Show the entry that would be written without writing it
    #[arg(short, long)]
    pub preview: bool,

    /// Only include commits touching this path, relative to the project root
    #[arg(long)]
    pub project_path: Option<PathBuf>,
}

/// Options of the latest command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: LatestFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print only the version
    #[arg(long, conflicts_with_all = ["content_only", "raw"])]
    pub version_only: bool,

    /// Print only the entry body
    #[arg(long, conflicts_with = "raw")]
    pub content_only: bool,

    /// Read this changelog instead of the configured one
    #[arg(long)]
    pub changelog_path: Option<PathBuf>,

    /// Print the entry exactly as written
    #[arg(long)]
    pub raw: bool,
}

impl LatestArgs {
    /// Which part of the entry to print
    #[must_use]
    pub fn view(&self) -> LatestView {
        if self.raw {
            LatestView::Raw
        } else if self.version_only {
            LatestView::VersionOnly
        } else if self.content_only {
            LatestView::ContentOnly
        } else {
            LatestView::Full
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Prepend a new entry for the commits since the last one
    Generate(GenerateArgs),

    /// Write a sample changelog-config.json
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Inspect the configuration
    Config {
        /// Validate the config file
        #[arg(long, conflicts_with = "show")]
        check: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },

    /// Print the newest changelog entry
    Latest(LatestArgs),
}

impl Cli {
    /// Get the effective log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// Run the selected command in `cwd`, writing results to `out`
    ///
    /// # Errors
    ///
    /// Returns an error describing the failure; the caller maps it to exit
    /// code 1.
    pub fn run(&self, cwd: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
        match self.command {
            None => run_generate(&self.generate, cwd, out),
            Some(Command::Generate(ref args)) => run_generate(args, cwd, out),
            Some(Command::Init { force }) => run_init(cwd, force, out),
            Some(Command::Config { check, show }) => run_config(cwd, check, show, out),
            Some(Command::Latest(ref args)) => run_latest(args, cwd, self.quiet, out),
        }
    }
}

fn resolve(cwd: &Path, path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => cwd.to_path_buf(),
    }
}

fn run_generate(args: &GenerateArgs, cwd: &Path, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut options = GenerateOptions::new(resolve(cwd, args.path.as_deref())).force(args.force);
    if let Some(ref project_path) = args.project_path {
        options = options.with_project_path(project_path);
    }

    if args.preview {
        let result = preview(&options);
        if !result.success {
            bail!(result.message);
        }
        match result.preview_content {
            Some(content) => {
                writeln!(
                    out,
                    "Preview ({} commits, version {}):\n",
                    result.commits_count,
                    result.version.as_deref().unwrap_or_default()
                )?;
                write!(out, "{content}")?;
            }
            None => writeln!(out, "{}", result.message)?,
        }
        return Ok(());
    }

    let result = generate(&options);
    if !result.success {
        bail!(result.message);
    }
    if result.updated {
        writeln!(
            out,
            "{}: added {} commits for version {} to {}",
            result.message,
            result.commits_count,
            result.version.as_deref().unwrap_or_default(),
            result
                .changelog_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )?;
    } else {
        writeln!(out, "{}", result.message)?;
    }
    Ok(())
}

fn run_init(cwd: &Path, force: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    if init_config(cwd, force)? {
        writeln!(out, "Created {}", cwd.join(CONFIG_FILE_NAME).display())?;
    } else {
        writeln!(
            out,
            "{CONFIG_FILE_NAME} already exists (use --force to overwrite)"
        )?;
    }
    Ok(())
}

fn run_config(cwd: &Path, check: bool, show: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    if check {
        let result = check_config(cwd);
        if !result.valid {
            bail!(result.message);
        }
        writeln!(out, "{}", result.message)?;
        return Ok(());
    }

    let config = load_config(cwd);
    if show {
        writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
        return Ok(());
    }

    match find_config_file(cwd) {
        Some(path) => writeln!(out, "Config file: {}", path.display())?,
        None => writeln!(out, "Config file: none (using defaults)")?,
    }
    writeln!(out, "Changelog: {}", config.changelog_path(cwd).display())?;
    writeln!(
        out,
        "Grouping: {}",
        if config.grouping_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    )?;
    Ok(())
}

fn run_latest(args: &LatestArgs, cwd: &Path, quiet: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(cwd);
    let path = match args.changelog_path {
        Some(ref p) => resolve(cwd, Some(p)),
        None => config.changelog_path(cwd),
    };

    let Some(document) = read_document(&path)? else {
        bail!("Changelog not found: {}", path.display());
    };
    let entry = latest_entry(
        &document,
        &config.format.header_template,
        &config.versioning.version_prefix,
        &path,
    )?;
    let text = format_latest(&entry, args.format, args.view())?;

    match args.output {
        Some(ref output) => {
            let output = resolve(cwd, Some(output));
            std::fs::write(&output, format!("{text}\n"))
                .with_context(|| format!("Failed to write {}", output.display()))?;
            if !quiet {
                writeln!(out, "Wrote latest entry ({}) to {}", entry.version, output.display())?;
            }
        }
        None => writeln!(out, "{text}")?,
    }
    Ok(())
}
