// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns a detached broker subprocess when the Acquirer finds no leader.

use std::path::Path;
use std::process::{Command, Stdio};

/// Re-exec the current binary in `daemon` mode, detached from this
/// process's stdio, with the endpoint path passed through the environment.
pub fn spawn_detached_daemon(endpoint_path: &Path) -> std::io::Result<()> {
    let exe = std::env::current_exe()?;
    Command::new(exe)
        .arg("daemon")
        .env("SYMPOSIUM_SOCK", endpoint_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}
