// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! changelog-gen: incremental changelog synthesis
//!
//! Each run finds the newest `Last commit:` watermark in the changelog,
//! collects the commits made since, filters and optionally groups them, and
//! prepends one new version entry. Running twice without new commits leaves
//! the document byte-for-byte unchanged.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod init;
pub mod render;
pub mod rules;
pub mod version;

pub use config::EffectiveConfig;
pub use error::ChangelogError;
pub use generator::{GenerateOptions, GenerateResult, PreviewResult, Synthesizer, generate, preview};
