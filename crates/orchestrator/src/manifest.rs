// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic manifest persistence: write-temporary-then-rename, with schema
//! version enforcement on load.

use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use symposium_core::SCHEMA_VERSION;

use crate::error::OrchestratorError;

/// Save `value` to `path` atomically: write to a sibling `.tmp` file, then
/// rename over the destination so a crash mid-write never corrupts it.
pub fn save_manifest<T: Serialize>(path: &Path, value: &T) -> Result<(), OrchestratorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load and parse a manifest whose `schema_version` field must not exceed
/// [`SCHEMA_VERSION`].
pub fn load_manifest<T>(path: &Path) -> Result<T, OrchestratorError>
where
    T: DeserializeOwned,
{
    let bytes = fs::read(path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    let version = value.get("schema_version").and_then(|v| v.as_u64()).unwrap_or(0);
    if version > SCHEMA_VERSION as u64 {
        return Err(OrchestratorError::ValidationError(format!(
            "manifest at {} has schema_version {version}, newer than the {SCHEMA_VERSION} this build understands",
            path.display(),
        )));
    }
    serde_json::from_value(value).map_err(|error| {
        OrchestratorError::ValidationError(format!("{} failed to parse: {error}", path.display()))
    })
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
