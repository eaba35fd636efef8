// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Config file bootstrap and validation

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{CONFIG_FILE_NAME, EffectiveConfig};
use crate::error::ChangelogError;

/// Write a sample `changelog-config.json` into `dir`
///
/// Returns `Ok(false)` without touching the file when it already exists and
/// `force` is not set.
///
/// # Errors
///
/// Returns `ChangelogError::Io` if the file cannot be written.
pub fn init_config(dir: &Path, force: bool) -> Result<bool, ChangelogError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        warn!(path = %path.display(), "Config file already exists, use --force to overwrite");
        return Ok(false);
    }

    let mut text = serde_json::to_string_pretty(&EffectiveConfig::sample()).map_err(|source| {
        ChangelogError::Json {
            path: path.clone(),
            source,
        }
    })?;
    text.push('\n');

    std::fs::write(&path, text).map_err(|e| ChangelogError::io(&path, e))?;
    info!(path = %path.display(), "Wrote config file");
    Ok(true)
}

/// Result of checking a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigCheck {
    /// Whether the file parsed and validated
    pub valid: bool,
    /// Description of the result
    pub message: String,
    /// The file that was checked
    pub path: Option<PathBuf>,
}

/// Check the config file that applies to `dir`
///
/// A missing file is valid: the defaults apply.
#[must_use]
pub fn check_config(dir: &Path) -> ConfigCheck {
    let Some(path) = crate::config::find_config_file(dir) else {
        return ConfigCheck {
            valid: true,
            message: format!("No {CONFIG_FILE_NAME} found, using defaults"),
            path: None,
        };
    };

    match EffectiveConfig::from_file(&path) {
        Ok(_) => ConfigCheck {
            valid: true,
            message: "Configuration is valid".to_string(),
            path: Some(path),
        },
        Err(e) => ConfigCheck {
            valid: false,
            message: e.to_string(),
            path: Some(path),
        },
    }
}
