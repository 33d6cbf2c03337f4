// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `symposium project create`: materialize a new Project directory. A local
//! filesystem operation, not a bus request — there's no Orchestrator to ask
//! until one is pointed at this directory.

use std::path::PathBuf;

use anyhow::Context;
use symposium_orchestrator::ProjectStore;

#[allow(clippy::too_many_arguments)]
pub fn create(
    path: PathBuf,
    name: String,
    source_repository: String,
    default_branch: String,
    preferred_agent_tag: Option<String>,
    stacked_layout: bool,
) -> anyhow::Result<()> {
    ProjectStore::create(
        &path,
        name,
        source_repository,
        default_branch,
        preferred_agent_tag,
        stacked_layout,
    )
    .with_context(|| format!("failed to create project at {}", path.display()))?;
    println!("created project at {}", path.display());
    Ok(())
}
