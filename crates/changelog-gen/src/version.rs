// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Project version discovery

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::VersioningConfig;
use crate::error::ChangelogError;

const CARGO_MANIFEST: &str = "Cargo.toml";
const NPM_MANIFEST: &str = "package.json";

/// Determine the version to record for `project_root`
///
/// # Errors
///
/// Returns `MissingVersionSource` if the manifest does not exist and
/// `MissingVersionField` if it has no version.
pub fn detect_version(
    project_root: &Path,
    versioning: &VersioningConfig,
) -> Result<String, ChangelogError> {
    if !versioning.auto_detect_version {
        return Ok(versioning.fallback_version.clone());
    }

    let manifest = match versioning.version_source.as_str() {
        "" | "auto" => [CARGO_MANIFEST, NPM_MANIFEST]
            .iter()
            .map(|name| project_root.join(name))
            .find(|path| path.is_file())
            .unwrap_or_else(|| project_root.join(NPM_MANIFEST)),
        source => project_root.join(source),
    };

    let version = read_manifest_version(&manifest)?;
    debug!(manifest = %manifest.display(), version = %version, "Detected version");
    Ok(version)
}

/// Read the version field of a manifest, TOML or JSON by extension
///
/// # Errors
///
/// See [`detect_version`].
pub fn read_manifest_version(manifest: &Path) -> Result<String, ChangelogError> {
    let text = match std::fs::read_to_string(manifest) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ChangelogError::MissingVersionSource {
                path: manifest.to_path_buf(),
            });
        }
        Err(e) => return Err(ChangelogError::io(manifest, e)),
    };

    let is_toml = manifest.extension().is_some_and(|ext| ext == "toml");
    let version = if is_toml {
        toml_version(&text, manifest)?
    } else {
        json_version(&text, manifest)?
    };

    version
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ChangelogError::MissingVersionField {
            path: manifest.to_path_buf(),
        })
}

/// `package.version`, then `workspace.package.version`
fn toml_version(text: &str, path: &Path) -> Result<Option<String>, ChangelogError> {
    let doc: toml::Table = toml::from_str(text).map_err(|source| ChangelogError::Toml {
        path: PathBuf::from(path),
        source,
    })?;

    let package = doc.get("package").and_then(|p| p.get("version"));
    let workspace = doc
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"));

    // `version.workspace = true` is a table, not a string
    Ok(package
        .and_then(toml::Value::as_str)
        .or_else(|| workspace.and_then(toml::Value::as_str))
        .map(str::to_string))
}

fn json_version(text: &str, path: &Path) -> Result<Option<String>, ChangelogError> {
    let doc: serde_json::Value =
        serde_json::from_str(text).map_err(|source| ChangelogError::Json {
            path: PathBuf::from(path),
            source,
        })?;
    Ok(doc
        .get("version")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string))
}
