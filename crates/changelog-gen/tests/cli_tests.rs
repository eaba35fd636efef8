// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI parsing and command tests
//!
//! Parsing is checked with `Cli::try_parse_from`; commands run through
//! `Cli::run` against temporary repositories with output captured in memory.


use std::path::PathBuf;

use changelog_gen::cli::{Cli, Command, GenerateArgs};
use changelog_gen::document::{LatestFormat, LatestView};
use clap::Parser;
use fixtures::TestRepo;
use similar_asserts::assert_eq;
use tracing::Level;

fn run(repo: &TestRepo, args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(args).expect("parse should succeed");
    let mut out = Vec::new();
    cli.run(repo.path(), &mut out)?;
    Ok(String::from_utf8(out).expect("utf8 output"))
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_no_args_generates_in_cwd() {
    let cli = Cli::try_parse_from(["changelog-gen"]).expect("parse should succeed");
    assert_eq!(cli.command, None);
    assert_eq!(cli.generate, GenerateArgs::default());
}

#[test]
fn test_top_level_generate_flags() {
    let cli = Cli::try_parse_from([
        "changelog-gen",
        "proj",
        "--force",
        "--preview",
        "--project-path",
        "packages/a",
    ])
    .expect("parse should succeed");

    assert_eq!(cli.generate.path, Some(PathBuf::from("proj")));
    assert!(cli.generate.force);
    assert!(cli.generate.preview);
    assert_eq!(cli.generate.project_path, Some(PathBuf::from("packages/a")));
}

#[test]
fn test_generate_subcommand() {
    let cli = Cli::try_parse_from(["changelog-gen", "generate", "-f"]).expect("parse should succeed");
    match cli.command {
        Some(Command::Generate(args)) => assert!(args.force),
        other => panic!("Expected Generate, got {other:?}"),
    }
}

#[test]
fn test_init_force() {
    let cli = Cli::try_parse_from(["changelog-gen", "init", "--force"]).expect("parse should succeed");
    assert_eq!(cli.command, Some(Command::Init { force: true }));
}

#[test]
fn test_config_check_and_show_conflict() {
    let result = Cli::try_parse_from(["changelog-gen", "config", "--check", "--show"]);
    assert!(result.is_err(), "--check and --show are exclusive");
}

#[test]
fn test_latest_options() {
    let cli = Cli::try_parse_from([
        "changelog-gen",
        "latest",
        "--format",
        "json",
        "--version-only",
        "--changelog-path",
        "docs/CHANGELOG.md",
    ])
    .expect("parse should succeed");

    match cli.command {
        Some(Command::Latest(args)) => {
            assert_eq!(args.format, LatestFormat::Json);
            assert_eq!(args.view(), LatestView::VersionOnly);
            assert_eq!(args.changelog_path, Some(PathBuf::from("docs/CHANGELOG.md")));
        }
        other => panic!("Expected Latest, got {other:?}"),
    }
}

#[test]
fn test_latest_rejects_unknown_format() {
    let result = Cli::try_parse_from(["changelog-gen", "latest", "--format", "yaml"]);
    assert!(result.is_err());
}

#[test]
fn test_latest_version_only_conflicts_with_raw() {
    let result = Cli::try_parse_from(["changelog-gen", "latest", "--version-only", "--raw"]);
    assert!(result.is_err());
}

#[test]
fn test_latest_quiet_is_global() {
    let cli = Cli::try_parse_from(["changelog-gen", "latest", "--quiet"]).expect("parse should succeed");
    assert!(cli.quiet);
    assert_eq!(cli.log_level(), Level::WARN);
}

#[test]
fn test_verbose_sets_debug_log_level() {
    let cli = Cli::try_parse_from(["changelog-gen", "-v"]).expect("parse should succeed");
    assert!(cli.verbose);
    assert_eq!(cli.log_level(), Level::DEBUG);
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_generate_then_nothing_to_do() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "1", "feat: add login");

    let first = run(&repo, &["changelog-gen"]).expect("generate");
    assert!(first.starts_with("Changelog updated: added 1 commits for version 1.0.0"));

    let second = run(&repo, &["changelog-gen", "generate"]).expect("generate");
    assert_eq!(second, "No new commits\n");
}

#[test]
fn test_preview_prints_entry() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "1", "feat: add login");

    let out = run(&repo, &["changelog-gen", "--preview"]).expect("preview");
    assert!(out.starts_with("Preview (1 commits, version 1.0.0):"));
    assert!(out.contains("## [1.0.0] - "));
    assert!(!repo.has_changelog());
}

#[test]
fn test_generate_failure_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cli = Cli::try_parse_from(["changelog-gen"]).expect("parse should succeed");
    let err = cli
        .run(dir.path(), &mut Vec::new())
        .expect_err("should fail outside a repository");
    assert!(err.to_string().starts_with("Not a git repository"));
}

#[test]
fn test_latest_after_two_runs() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "1", "feat: add login");
    run(&repo, &["changelog-gen"]).expect("generate");
    repo.write("package.json", r#"{ "version": "1.1.0" }"#);
    let head = repo.commit("a.txt", "2", "feat: add logout");
    run(&repo, &["changelog-gen"]).expect("generate");

    let version = run(&repo, &["changelog-gen", "latest", "--version-only"]).expect("latest");
    assert_eq!(version, "1.1.0\n");

    let content = run(&repo, &["changelog-gen", "latest", "--content-only"]).expect("latest");
    assert!(content.contains("feat: add logout"));
    assert!(!content.contains("feat: add login"));

    let json = run(&repo, &["changelog-gen", "latest", "--format", "json"]).expect("latest");
    let value: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(value["version"], "1.1.0");
    assert_eq!(value["last_commit"], head.as_str());
}

#[test]
fn test_latest_to_file() {
    let repo = TestRepo::new();
    repo.commit("a.txt", "1", "feat: add login");
    run(&repo, &["changelog-gen"]).expect("generate");

    let out = run(&repo, &["changelog-gen", "latest", "--raw", "-o", "latest.md"]).expect("latest");
    assert!(out.starts_with("Wrote latest entry (1.0.0)"));

    let written = std::fs::read_to_string(repo.path().join("latest.md")).expect("read");
    assert!(written.starts_with("## [1.0.0] - "));

    let quiet = run(
        &repo,
        &["changelog-gen", "latest", "--raw", "-o", "latest.md", "--quiet"],
    )
    .expect("latest");
    assert_eq!(quiet, "");
}

#[test]
fn test_latest_unrecognized_document() {
    let repo = TestRepo::new();
    repo.write("CHANGELOG.md", "# Changelog\n\nNothing released yet.\n");

    let err = run(&repo, &["changelog-gen", "latest"]).expect_err("should fail");
    assert!(err.to_string().starts_with("No version header found"));
}
