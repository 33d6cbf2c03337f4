// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates inbound bus envelopes into [`ProjectStore`] mutations and
//! emits the replies/broadcasts each operation requires.
//!
//! Delete's confirmation round trip and a Tool Server's original request
//! both ride the `DeleteResponse` tag, which the broker routes by
//! correlation id rather than broadcasting — the same mechanism serves two
//! separate hops: Engine-to-editor (asking for confirmation) and
//! Engine-to-requester (the final verdict).

use std::time::Duration;

use serde::Deserialize;
use symposium_adapters::SourceAdapter;
use symposium_core::{
    Addressee, Clock, Envelope, IdGen, MessageId, ProgressCategory, Tag, TaskspaceId, UuidIdGen,
    WindowHandle,
};
use tracing::{info, warn};

use crate::bus::OrchestratorBus;
use crate::error::OrchestratorError;
use crate::store::ProjectStore;

/// How long Engine waits for the UI to answer a delete-confirmation prompt.
const DELETE_CONFIRM_DEADLINE: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpawnRequest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_branch")]
    branch: String,
    #[serde(default)]
    initial_prompt: String,
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    taskspace_id: TaskspaceId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    taskspace_id: TaskspaceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogProgressRequest {
    taskspace_id: TaskspaceId,
    message: String,
    category: ProgressCategory,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalUserRequest {
    taskspace_id: TaskspaceId,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterWindowRequest {
    taskspace_id: TaskspaceId,
    handle: String,
}

#[derive(Debug, Deserialize)]
struct DeleteConfirmReply {
    #[serde(default)]
    confirmed: bool,
}

/// Owns the currently-open Project (if any) and the bus connection,
/// dispatching one inbound envelope at a time.
pub struct Engine<S: SourceAdapter, C: Clock> {
    store: Option<ProjectStore>,
    bus: OrchestratorBus,
    source: S,
    clock: C,
}

impl<S: SourceAdapter, C: Clock> Engine<S, C> {
    pub fn new(bus: OrchestratorBus, source: S, clock: C) -> Self {
        Self {
            store: None,
            bus,
            source,
            clock,
        }
    }

    pub fn open(&mut self, project_path: &std::path::Path) -> Result<(), OrchestratorError> {
        self.store = Some(ProjectStore::open(project_path)?);
        Ok(())
    }

    pub fn close(&mut self) {
        self.store = None;
    }

    fn store_mut(&mut self) -> Result<&mut ProjectStore, OrchestratorError> {
        self.store
            .as_mut()
            .ok_or_else(|| OrchestratorError::StateConflict("no project is open".to_string()))
    }

    /// Handle one inbound envelope, replying or broadcasting as the
    /// operation requires. Errors are logged, not propagated — a single bad
    /// envelope must not take down the dispatch loop.
    pub async fn handle(&mut self, envelope: Envelope) {
        let tag = envelope.tag.clone();
        let result = match tag {
            Tag::SpawnTaskspace => self.handle_spawn(envelope).await,
            Tag::UpdateTaskspace => self.handle_update(envelope).await,
            Tag::DeleteTaskspace => self.handle_delete(envelope).await,
            Tag::LogProgress => self.handle_log_progress(envelope),
            Tag::SignalUser => self.handle_signal_user(envelope),
            Tag::RegisterTaskspaceWindow => self.handle_register_window(envelope),
            other => {
                warn!(?other, "orchestrator has no handler for this tag, ignoring");
                Ok(())
            }
        };
        if let Err(error) = result {
            warn!(%error, ?tag, "failed to handle inbound envelope");
        }
    }

    async fn handle_spawn(&mut self, envelope: Envelope) -> Result<(), OrchestratorError> {
        let request: SpawnRequest = serde_json::from_value(envelope.payload.clone())?;
        let id = TaskspaceId::new(UuidIdGen.next());
        let taskspace = self
            .store_mut()?
            .spawn(
                &self.source,
                &self.clock,
                id,
                request.name,
                request.description,
                request.branch,
                request.initial_prompt,
            )
            .await?;
        self.broadcast_taskspace_updated(&envelope.id, &taskspace)
    }

    async fn handle_update(&mut self, envelope: Envelope) -> Result<(), OrchestratorError> {
        let request: UpdateRequest = serde_json::from_value(envelope.payload.clone())?;
        let taskspace = self
            .store_mut()?
            .update(&request.taskspace_id, request.name, request.description)?;
        self.broadcast_taskspace_updated(&envelope.id, &taskspace)
    }

    fn broadcast_taskspace_updated(
        &self,
        request_id: &MessageId,
        taskspace: &symposium_core::Taskspace,
    ) -> Result<(), OrchestratorError> {
        let update = Envelope::new(
            MessageId::new(UuidIdGen.next()),
            Tag::TaskspaceUpdated,
            serde_json::to_value(taskspace)?,
        )
        .with_correlation(request_id.clone());
        self.bus.publish(update)
    }

    /// Ask the editor to confirm, then either delete and reply success or
    /// reply cancellation — never both, and never neither.
    async fn handle_delete(&mut self, envelope: Envelope) -> Result<(), OrchestratorError> {
        let request: DeleteRequest = serde_json::from_value(envelope.payload.clone())?;

        let ask = Envelope::new(
            MessageId::new(UuidIdGen.next()),
            Tag::DeleteTaskspace,
            serde_json::json!({"taskspaceId": request.taskspace_id.as_str()}),
        )
        .with_addressee(Addressee::Editor {
            taskspace_id: request.taskspace_id.clone(),
        });

        let confirm_result = self.bus.request(ask, DELETE_CONFIRM_DEADLINE).await;
        let confirmed = match confirm_result {
            Ok(reply) => {
                let confirm: DeleteConfirmReply = serde_json::from_value(reply.payload)?;
                confirm.confirmed
            }
            Err(OrchestratorError::Timeout) => false,
            Err(other) => return Err(other),
        };

        let response_payload = if confirmed {
            self.store_mut()?.delete(&request.taskspace_id)?;
            info!(taskspace = %request.taskspace_id, "deleted taskspace");
            serde_json::json!({"status": "deleted"})
        } else {
            serde_json::json!({"status": "cancelled"})
        };

        let response = Envelope::new(MessageId::new(UuidIdGen.next()), Tag::DeleteResponse, response_payload)
            .with_correlation(envelope.id);
        self.bus.publish(response)
    }

    fn handle_log_progress(&mut self, envelope: Envelope) -> Result<(), OrchestratorError> {
        let request: LogProgressRequest = serde_json::from_value(envelope.payload.clone())?;
        let taskspace =
            self.store_mut()?
                .log_progress(&self.clock, &request.taskspace_id, request.message, request.category)?;
        self.broadcast_taskspace_updated(&envelope.id, &taskspace)
    }

    fn handle_signal_user(&mut self, envelope: Envelope) -> Result<(), OrchestratorError> {
        let request: SignalUserRequest = serde_json::from_value(envelope.payload.clone())?;
        let taskspace = self
            .store_mut()?
            .signal_user(&self.clock, &request.taskspace_id, request.message)?;
        self.broadcast_taskspace_updated(&envelope.id, &taskspace)
    }

    fn handle_register_window(&mut self, envelope: Envelope) -> Result<(), OrchestratorError> {
        let request: RegisterWindowRequest = serde_json::from_value(envelope.payload.clone())?;
        let store = self.store_mut()?;
        store.register_window(&self.clock, &request.taskspace_id, WindowHandle(request.handle))?;
        store.activate(&request.taskspace_id)?;
        Ok(())
    }

    /// Ask every live editor peer to re-register its window; used once after
    /// this Orchestrator restarts and reopens a Project.
    pub fn roll_call(&self) -> Result<(), OrchestratorError> {
        let envelope = Envelope::new(MessageId::new(UuidIdGen.next()), Tag::TaskspaceRollCall, serde_json::Value::Null);
        self.bus.publish(envelope)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
