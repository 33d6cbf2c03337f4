// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolving the broker endpoint path: an explicit `--endpoint` flag wins,
//! otherwise the same `$SYMPOSIUM_SOCK` / `$XDG_RUNTIME_DIR` / `/tmp`
//! fallback chain the broker itself uses.

use std::path::PathBuf;

pub fn resolve_endpoint(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(symposium_broker::config::default_endpoint_path)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
