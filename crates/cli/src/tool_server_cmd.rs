// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `symposium tool-server`: run the Tool Server layer on this process's
//! stdin/stdout, for an agent runtime to call into.

use std::path::PathBuf;

use anyhow::Context;
use symposium_tools::Deadlines;

pub async fn run(endpoint: PathBuf) -> anyhow::Result<()> {
    symposium_tools::run_stdio(endpoint, Deadlines::default())
        .await
        .context("tool server exited with an error")
}
