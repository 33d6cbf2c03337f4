// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::replay::ReplayBounds;
use std::path::PathBuf;
use std::time::Duration;

/// Broker configuration: endpoint path, quiet interval, and replay buffer
/// bounds, each overridable from the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_path: PathBuf,
    pub quiet_interval: Duration,
    pub replay_bounds: ReplayBounds,
    pub max_line_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_path: default_endpoint_path(),
            quiet_interval: Duration::from_secs(5 * 60),
            replay_bounds: ReplayBounds::default(),
            max_line_bytes: 1024 * 1024,
        }
    }
}

/// `$SYMPOSIUM_SOCK` override, else `$XDG_RUNTIME_DIR/symposium.sock`, else
/// `/tmp/symposium-<user>/symposium.sock`.
pub fn default_endpoint_path() -> PathBuf {
    if let Ok(path) = std::env::var("SYMPOSIUM_SOCK") {
        return PathBuf::from(path);
    }
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(dir).join("symposium.sock");
    }
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "default".to_string());
    PathBuf::from(format!("/tmp/symposium-{user}")).join("symposium.sock")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
