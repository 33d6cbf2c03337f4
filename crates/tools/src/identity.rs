// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Implicit self-identity: a Tool Server is launched inside a Taskspace's
//! working directory and has to find its own (project, taskspace) pair
//! without being told explicitly.

use std::path::{Path, PathBuf};

use symposium_core::{TaskspaceId, PROJECT_MANIFEST_NAME, TASKSPACE_DIR_PREFIX};

use crate::error::ToolError;

/// The (project path, taskspace identifier) pair every outbound envelope
/// whose payload needs "self" is stamped with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    pub project_path: PathBuf,
    pub taskspace_id: TaskspaceId,
}

/// Walk up from `start` looking for the nearest ancestor directory whose
/// name matches the taskspace directory convention and whose parent holds
/// the project manifest.
pub fn resolve_self_identity(start: &Path) -> Result<SelfIdentity, ToolError> {
    let mut candidate = Some(start);
    while let Some(dir) = candidate {
        if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
            if let Some(id) = name.strip_prefix(TASKSPACE_DIR_PREFIX) {
                if let Some(project_path) = dir.parent() {
                    if project_path.join(PROJECT_MANIFEST_NAME).is_file() {
                        return Ok(SelfIdentity {
                            project_path: project_path.to_path_buf(),
                            taskspace_id: TaskspaceId::new(id),
                        });
                    }
                }
            }
        }
        candidate = dir.parent();
    }
    Err(ToolError::SelfIdentityNotFound)
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
