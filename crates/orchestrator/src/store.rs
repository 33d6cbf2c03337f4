// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk Project/Taskspace truth. Pure local operations: no bus I/O here,
//! only [`crate::engine`] translates inbound envelopes into calls on this
//! store and persists their effect.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use symposium_adapters::SourceAdapter;
use symposium_core::{
    AttentionSignal, Clock, Project, ProgressCategory, ProgressEntry, Taskspace, TaskspaceId,
    WindowHandle, PROJECT_MANIFEST_NAME, TASKSPACE_DIR_PREFIX, TASKSPACE_MANIFEST_NAME,
};
use tracing::warn;

use crate::error::OrchestratorError;
use crate::manifest::{load_manifest, save_manifest};

fn taskspace_dir(project_path: &Path, id: &TaskspaceId) -> PathBuf {
    project_path.join(format!("{TASKSPACE_DIR_PREFIX}{}", id.as_str()))
}

/// The loaded, mutable state of one open Project, plus the path it was
/// loaded from.
pub struct ProjectStore {
    project_path: PathBuf,
    project: Project,
    taskspaces: BTreeMap<TaskspaceId, Taskspace>,
}

impl ProjectStore {
    /// Validate and load an existing Project directory: manifest present,
    /// parseable, schema version acceptable. Reconciles the activation order
    /// against what's actually on disk rather than failing outright — a
    /// mismatch here means a prior crash interrupted a persist, not that the
    /// project is unreadable.
    pub fn open(project_path: &Path) -> Result<Self, OrchestratorError> {
        let manifest_path = project_path.join(PROJECT_MANIFEST_NAME);
        let mut project: Project = load_manifest(&manifest_path)?;

        let mut taskspaces = BTreeMap::new();
        let mut found_ids = Vec::new();
        if project_path.is_dir() {
            for entry in std::fs::read_dir(project_path)? {
                let entry = entry?;
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                let Some(id_str) = name.strip_prefix(TASKSPACE_DIR_PREFIX) else {
                    continue;
                };
                let id = TaskspaceId::new(id_str);
                let taskspace: Taskspace = load_manifest(&entry.path().join(TASKSPACE_MANIFEST_NAME))?;
                found_ids.push(id.clone());
                taskspaces.insert(id, taskspace);
            }
        }

        let known: std::collections::BTreeSet<_> = project.activation_order.iter().cloned().collect();
        let on_disk: std::collections::BTreeSet<_> = found_ids.iter().cloned().collect();
        if known != on_disk {
            warn!(
                project = %project_path.display(),
                "activation order disagreed with on-disk taskspaces, reconciling",
            );
            project.activation_order.retain(|id| on_disk.contains(id));
            for id in &found_ids {
                if !project.activation_order.contains(id) {
                    project.activation_order.push(id.clone());
                }
            }
        }

        Ok(Self {
            project_path: project_path.to_path_buf(),
            project,
            taskspaces,
        })
    }

    /// Materialize a new, empty Project directory and manifest.
    pub fn create(
        project_path: &Path,
        name: String,
        source_repository: String,
        default_branch: String,
        preferred_agent_tag: Option<String>,
        stacked_layout: bool,
    ) -> Result<Self, OrchestratorError> {
        std::fs::create_dir_all(project_path)?;
        let project = Project::new(name, source_repository, default_branch, preferred_agent_tag, stacked_layout);
        save_manifest(&project_path.join(PROJECT_MANIFEST_NAME), &project)?;
        Ok(Self {
            project_path: project_path.to_path_buf(),
            project,
            taskspaces: BTreeMap::new(),
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn taskspace(&self, id: &TaskspaceId) -> Option<&Taskspace> {
        self.taskspaces.get(id)
    }

    /// Move a Taskspace to the front of the activation order and persist.
    pub fn activate(&mut self, id: &TaskspaceId) -> Result<(), OrchestratorError> {
        if !self.taskspaces.contains_key(id) {
            return Err(OrchestratorError::NotFound(id.as_str().to_string()));
        }
        let before = self.project.clone();
        self.project.activate(id);
        self.persist_project().inspect_err(|_| self.project = before.clone())?;
        Ok(())
    }

    async fn materialize_and_write<S: SourceAdapter>(
        &self,
        source: &S,
        id: &TaskspaceId,
        branch: &str,
    ) -> Result<(), OrchestratorError> {
        source
            .materialize(&taskspace_dir(&self.project_path, id), &self.project.source_repository, branch)
            .await
            .map_err(|error| OrchestratorError::PermissionDenied(std::io::Error::other(error.to_string())))
    }

    /// Create a Taskspace directory, materialize its source tree, write the
    /// initial Hatchling manifest, and persist both it and the updated
    /// Project activation order.
    pub async fn spawn<S: SourceAdapter, C: Clock>(
        &mut self,
        source: &S,
        clock: &C,
        id: TaskspaceId,
        name: String,
        description: String,
        branch: String,
        initial_prompt: String,
    ) -> Result<Taskspace, OrchestratorError> {
        if self.taskspaces.contains_key(&id) {
            return Err(OrchestratorError::StateConflict(format!(
                "taskspace {} already exists",
                id.as_str()
            )));
        }

        self.materialize_and_write(source, &id, &branch).await?;

        let taskspace = Taskspace::new_hatchling(id.clone(), name, description, branch, initial_prompt, clock.now_ms());
        let before = self.project.clone();
        self.project.activate(&id);
        self.taskspaces.insert(id.clone(), taskspace.clone());

        if let Err(error) = self.persist_taskspace(&id).and_then(|_| self.persist_project()) {
            self.project = before;
            self.taskspaces.remove(&id);
            let _ = std::fs::remove_dir_all(taskspace_dir(&self.project_path, &id));
            return Err(error);
        }
        Ok(taskspace)
    }

    /// Apply a name/description update, transitioning Hatchling->Resume on
    /// the first such event, and persist.
    pub fn update(
        &mut self,
        id: &TaskspaceId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Taskspace, OrchestratorError> {
        let before = self.taskspace_or_not_found(id)?.clone();
        let taskspace = self.taskspaces.get_mut(id).expect("checked above");
        if let Some(name) = name {
            taskspace.name = name;
        }
        if let Some(description) = description {
            taskspace.description = description;
        }
        taskspace.mark_active();

        self.persist_taskspace(id).inspect_err(|_| {
            self.taskspaces.insert(id.clone(), before.clone());
        })?;
        Ok(self.taskspaces.get(id).expect("just persisted").clone())
    }

    /// Remove a Taskspace's directory and drop it from the activation order.
    pub fn delete(&mut self, id: &TaskspaceId) -> Result<(), OrchestratorError> {
        self.taskspace_or_not_found(id)?;
        let dir = taskspace_dir(&self.project_path, id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        let before = self.project.clone();
        self.project.remove(id);
        if let Err(error) = self.persist_project() {
            self.project = before;
            return Err(error);
        }
        self.taskspaces.remove(id);
        Ok(())
    }

    pub fn log_progress<C: Clock>(
        &mut self,
        clock: &C,
        id: &TaskspaceId,
        message: String,
        category: ProgressCategory,
    ) -> Result<Taskspace, OrchestratorError> {
        let before = self.taskspace_or_not_found(id)?.clone();
        let taskspace = self.taskspaces.get_mut(id).expect("checked above");
        taskspace.log.push(ProgressEntry {
            timestamp_ms: clock.now_ms(),
            message,
            category,
        });
        self.persist_taskspace(id).inspect_err(|_| {
            self.taskspaces.insert(id.clone(), before.clone());
        })?;
        Ok(self.taskspaces.get(id).expect("just persisted").clone())
    }

    pub fn signal_user<C: Clock>(
        &mut self,
        clock: &C,
        id: &TaskspaceId,
        message: String,
    ) -> Result<Taskspace, OrchestratorError> {
        let before = self.taskspace_or_not_found(id)?.clone();
        let taskspace = self.taskspaces.get_mut(id).expect("checked above");
        taskspace.attention.push(AttentionSignal {
            timestamp_ms: clock.now_ms(),
            message,
        });
        self.persist_taskspace(id).inspect_err(|_| {
            self.taskspaces.insert(id.clone(), before.clone());
        })?;
        Ok(self.taskspaces.get(id).expect("just persisted").clone())
    }

    /// Record an editor peer's window handle for `id`, mark it live by
    /// bumping its activation timestamp, and persist.
    pub fn register_window<C: Clock>(
        &mut self,
        clock: &C,
        id: &TaskspaceId,
        handle: WindowHandle,
    ) -> Result<Taskspace, OrchestratorError> {
        let before = self.taskspace_or_not_found(id)?.clone();
        let taskspace = self.taskspaces.get_mut(id).expect("checked above");
        taskspace.window = Some(handle);
        taskspace.last_activated_ms = clock.now_ms();
        self.persist_taskspace(id).inspect_err(|_| {
            self.taskspaces.insert(id.clone(), before.clone());
        })?;
        Ok(self.taskspaces.get(id).expect("just persisted").clone())
    }

    pub fn taskspace_ids(&self) -> impl Iterator<Item = &TaskspaceId> {
        self.taskspaces.keys()
    }

    fn taskspace_or_not_found(&self, id: &TaskspaceId) -> Result<&Taskspace, OrchestratorError> {
        self.taskspaces
            .get(id)
            .ok_or_else(|| OrchestratorError::NotFound(id.as_str().to_string()))
    }

    fn persist_project(&self) -> Result<(), OrchestratorError> {
        save_manifest(&self.project_path.join(PROJECT_MANIFEST_NAME), &self.project)
    }

    fn persist_taskspace(&self, id: &TaskspaceId) -> Result<(), OrchestratorError> {
        let taskspace = self.taskspaces.get(id).expect("caller already checked existence");
        let dir = taskspace_dir(&self.project_path, id);
        save_manifest(&dir.join(TASKSPACE_MANIFEST_NAME), taskspace)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
