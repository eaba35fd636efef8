// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Property-based tests for synthesis runs
//!
//! These drive `Synthesizer` over an in-memory log so each case is cheap:
//! - the recorded watermark always reads back as the log head
//! - a run with nothing new leaves the document byte-identical
//! - a later run only ever prepends
//! - the watermark survives any section separator


use changelog_gen::config::EffectiveConfig;
use changelog_gen::document::{extract_watermark, read_document};
use changelog_gen::generator::{Outcome, Synthesizer};
use fixtures::FakeLog;
use proptest::prelude::*;

fn subject_strategy() -> impl Strategy<Value = String> {
    ("(feat|fix|docs|perf): ", "[a-z][a-z0-9 ]{0,30}").prop_map(|(kind, text)| kind + &text)
}

fn run(log: &FakeLog, path: &std::path::Path, version: &str) -> Outcome {
    let config = EffectiveConfig::default();
    Synthesizer::new(&config, log, version, "2026-01-01")
        .generate(path, None, false)
        .expect("synthesis should succeed")
        .outcome
        .expect("successful run has an outcome")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_watermark_round_trip(subjects in prop::collection::vec(subject_strategy(), 1..12)) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("CHANGELOG.md");
        let mut log = FakeLog::default();
        let mut head = String::new();
        for subject in &subjects {
            head = log.push(subject);
        }

        prop_assert_eq!(run(&log, &path, "1.0.0"), Outcome::Updated);
        let doc = read_document(&path).expect("read").expect("document exists");
        prop_assert_eq!(extract_watermark(Some(doc.as_str())), Some(head));
    }

    #[test]
    fn prop_rerun_is_byte_identical(subjects in prop::collection::vec(subject_strategy(), 1..8)) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("CHANGELOG.md");
        let mut log = FakeLog::default();
        for subject in &subjects {
            log.push(subject);
        }

        run(&log, &path, "1.0.0");
        let before = std::fs::read(&path).expect("read");
        prop_assert_eq!(run(&log, &path, "1.0.0"), Outcome::NoNewCommits);
        prop_assert_eq!(std::fs::read(&path).expect("read"), before);
    }

    #[test]
    fn prop_later_runs_only_prepend(
        first in prop::collection::vec(subject_strategy(), 1..6),
        second in prop::collection::vec(subject_strategy(), 1..6),
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("CHANGELOG.md");
        let mut log = FakeLog::default();
        for subject in &first {
            log.push(subject);
        }
        run(&log, &path, "1.0.0");
        let before = std::fs::read_to_string(&path).expect("read");

        for subject in &second {
            log.push(subject);
        }
        prop_assert_eq!(run(&log, &path, "1.1.0"), Outcome::Updated);
        let after = std::fs::read_to_string(&path).expect("read");

        prop_assert!(after.ends_with(&before));
        prop_assert!(after.starts_with("## [1.1.0] - 2026-01-01"));
        prop_assert_eq!(after.matches("## [").count(), 2);
    }

    #[test]
    fn prop_any_separator_keeps_watermark(
        separator in prop_oneof![
            Just(" | ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just(" ".to_string()),
            "[ a-z|-]{0,4}\n?",
        ],
        subjects in prop::collection::vec(subject_strategy(), 1..6),
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("CHANGELOG.md");
        let mut log = FakeLog::default();
        let mut head = String::new();
        for subject in &subjects {
            head = log.push(subject);
        }

        let mut config = EffectiveConfig::default();
        config.format.section_separator = separator;
        let run_once = || {
            Synthesizer::new(&config, &log, "1.0.0", "2026-01-01")
                .generate(&path, None, false)
                .expect("synthesis should succeed")
                .outcome
        };

        prop_assert_eq!(run_once(), Some(Outcome::Updated));
        let before = std::fs::read_to_string(&path).expect("read");
        prop_assert_eq!(extract_watermark(Some(before.as_str())), Some(head));

        prop_assert_eq!(run_once(), Some(Outcome::NoNewCommits));
        prop_assert_eq!(std::fs::read_to_string(&path).expect("read"), before);
    }
}
