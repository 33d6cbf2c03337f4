// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk domain model owned by the Orchestrator State Engine.

use crate::id::TaskspaceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current schema version written by this implementation. `open()` rejects
/// manifests with a higher version and accepts any version at or below it.
pub const SCHEMA_VERSION: u32 = 1;

/// Fixed relative path of a Project's manifest inside its directory.
pub const PROJECT_MANIFEST_NAME: &str = "project.json";

/// Prefix every Taskspace subdirectory name is built from: `task-<id>`.
pub const TASKSPACE_DIR_PREFIX: &str = "task-";

/// Fixed relative path of a Taskspace's manifest inside its subdirectory.
pub const TASKSPACE_MANIFEST_NAME: &str = "taskspace.json";

/// Lifecycle state of a Taskspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskspaceState {
    Hatchling,
    Resume,
}

/// Category of a progress entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressCategory {
    Informational,
    Warning,
    Error,
    Milestone,
    Question,
}

/// An immutable entry in a Taskspace's progress log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub timestamp_ms: u64,
    pub message: String,
    pub category: ProgressCategory,
}

/// A pending request for user attention (tool "Signal user").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionSignal {
    pub timestamp_ms: u64,
    pub message: String,
}

/// An opaque handle to a live editor window, supplied by the editor peer and
/// never interpreted by the core — carried by value, not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowHandle(pub String);

/// Persistent on-disk aggregate owned by the Orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taskspace {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub id: TaskspaceId,
    pub name: String,
    pub description: String,
    pub state: TaskspaceState,
    #[serde(default)]
    pub log: Vec<ProgressEntry>,
    #[serde(default)]
    pub attention: Vec<AttentionSignal>,
    #[serde(default)]
    pub window: Option<WindowHandle>,
    pub branch: String,
    pub last_activated_ms: u64,
    /// Only meaningful while `state == Hatchling`; cleared on first update.
    #[serde(default)]
    pub initial_prompt: Option<String>,
    /// Fields from a newer schema version this build doesn't recognize,
    /// preserved verbatim across load/modify/save.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_json::Value>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Taskspace {
    pub fn new_hatchling(
        id: TaskspaceId,
        name: String,
        description: String,
        branch: String,
        initial_prompt: String,
        now_ms: u64,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id,
            name,
            description,
            state: TaskspaceState::Hatchling,
            log: Vec::new(),
            attention: Vec::new(),
            window: None,
            branch,
            last_activated_ms: now_ms,
            initial_prompt: Some(initial_prompt),
            unknown_fields: BTreeMap::new(),
        }
    }

    /// Apply the first progress/update event, transitioning Hatchling→Resume
    /// at most once.
    pub fn mark_active(&mut self) {
        if self.state == TaskspaceState::Hatchling {
            self.state = TaskspaceState::Resume;
            self.initial_prompt = None;
        }
    }
}

/// Persistent on-disk aggregate owned by the Orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub name: String,
    pub source_repository: String,
    pub default_branch: String,
    pub preferred_agent_tag: Option<String>,
    #[serde(default)]
    pub stacked_layout: bool,
    /// Taskspace identifiers ordered by most-recent activation.
    pub activation_order: Vec<TaskspaceId>,
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_json::Value>,
}

impl Project {
    pub fn new(
        name: String,
        source_repository: String,
        default_branch: String,
        preferred_agent_tag: Option<String>,
        stacked_layout: bool,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name,
            source_repository,
            default_branch,
            preferred_agent_tag,
            stacked_layout,
            activation_order: Vec::new(),
            unknown_fields: BTreeMap::new(),
        }
    }

    /// Move a Taskspace to the front of the activation order.
    pub fn activate(&mut self, id: &TaskspaceId) {
        self.activation_order.retain(|existing| existing != id);
        self.activation_order.insert(0, id.clone());
    }

    pub fn remove(&mut self, id: &TaskspaceId) {
        self.activation_order.retain(|existing| existing != id);
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
