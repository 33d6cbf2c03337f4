// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed tool catalog exposed to the agent runtime, implemented on top
//! of bus envelopes.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use symposium_core::{Addressee, Envelope, ErrorKind, IdGen, MessageId, ReferenceToken, Tag, UuidIdGen};

use crate::client::BusClient;
use crate::error::ToolError;
use crate::identity::SelfIdentity;
use crate::references::ReferenceTable;

/// One request read from the agent runtime's side of stdio.
#[derive(Debug, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub tool: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ToolErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

/// One reply written back to the agent runtime.
#[derive(Debug, Serialize)]
pub struct ToolReply {
    pub call_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolErrorPayload>,
}

impl ToolReply {
    fn ok(call_id: String, result: serde_json::Value) -> Self {
        Self {
            call_id,
            result: Some(result),
            error: None,
        }
    }

    fn err(call_id: String, error: &ToolError) -> Self {
        Self {
            call_id,
            result: None,
            error: Some(ToolErrorPayload {
                kind: error.kind(),
                message: error.to_string(),
            }),
        }
    }
}

/// Per-tool timeouts. Operations that touch the filesystem (spawn, delete)
/// get more slack than interactive editor round trips.
#[derive(Debug, Clone)]
pub struct Deadlines {
    pub spawn_taskspace: Duration,
    pub update_taskspace: Duration,
    pub delete_taskspace: Duration,
    pub present_walkthrough: Duration,
    pub get_selection: Duration,
    pub ide_operation: Duration,
    pub expand_reference: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            spawn_taskspace: Duration::from_secs(30),
            update_taskspace: Duration::from_secs(10),
            delete_taskspace: Duration::from_secs(30),
            present_walkthrough: Duration::from_secs(5),
            get_selection: Duration::from_secs(5),
            ide_operation: Duration::from_secs(10),
            expand_reference: Duration::from_secs(5),
        }
    }
}

pub struct ToolCatalog {
    client: BusClient,
    identity: SelfIdentity,
    references: Arc<ReferenceTable>,
    deadlines: Deadlines,
}

impl ToolCatalog {
    /// `references` is shared with the broadcast observer installed on the
    /// client's read task, which keeps its own clone alive for as long as
    /// the connection is open.
    pub fn new(
        client: BusClient,
        identity: SelfIdentity,
        references: Arc<ReferenceTable>,
        deadlines: Deadlines,
    ) -> Self {
        Self {
            client,
            identity,
            references,
            deadlines,
        }
    }

    pub async fn dispatch(&self, call: ToolCall) -> ToolReply {
        match self.handle(&call.tool, call.input).await {
            Ok(result) => ToolReply::ok(call.call_id, result),
            Err(error) => ToolReply::err(call.call_id, &error),
        }
    }

    async fn handle(&self, tool: &str, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        match tool {
            "spawn_taskspace" => self.spawn_taskspace(input).await,
            "update_taskspace" => self.update_taskspace(input).await,
            "delete_taskspace" => self.delete_taskspace(input).await,
            "log_progress" => self.log_progress(input),
            "signal_user" => self.signal_user(input),
            "present_walkthrough" => self.present_walkthrough(input).await,
            "get_selection" => self.get_selection().await,
            "ide_operation" => self.ide_operation(input).await,
            "expand_reference" => self.expand_reference(input).await,
            other => Err(ToolError::BadRequest(format!("unknown tool '{other}'"))),
        }
    }

    fn with_self(&self, mut payload: serde_json::Value) -> serde_json::Value {
        if let Some(object) = payload.as_object_mut() {
            object.insert(
                "projectPath".to_string(),
                serde_json::Value::String(self.identity.project_path.display().to_string()),
            );
            object.insert(
                "taskspaceId".to_string(),
                serde_json::Value::String(self.identity.taskspace_id.as_str().to_string()),
            );
        }
        payload
    }

    async fn request_orchestrator(
        &self,
        tag: Tag,
        payload: serde_json::Value,
        deadline: Duration,
    ) -> Result<serde_json::Value, ToolError> {
        let envelope = Envelope::new(MessageId::new(UuidIdGen.next()), tag, payload)
            .with_addressee(Addressee::Orchestrator);
        let reply = self.client.request(envelope, deadline).await?;
        Ok(reply.payload)
    }

    async fn request_editor(
        &self,
        tag: Tag,
        payload: serde_json::Value,
        deadline: Duration,
    ) -> Result<serde_json::Value, ToolError> {
        let envelope = Envelope::new(MessageId::new(UuidIdGen.next()), tag, payload).with_addressee(
            Addressee::Editor {
                taskspace_id: self.identity.taskspace_id.clone(),
            },
        );
        let reply = self.client.request(envelope, deadline).await?;
        Ok(reply.payload)
    }

    async fn spawn_taskspace(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        self.request_orchestrator(Tag::SpawnTaskspace, input, self.deadlines.spawn_taskspace)
            .await
    }

    async fn update_taskspace(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let payload = self.with_self(input);
        self.request_orchestrator(Tag::UpdateTaskspace, payload, self.deadlines.update_taskspace)
            .await
    }

    async fn delete_taskspace(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let payload = self.with_self(input);
        self.request_orchestrator(Tag::DeleteTaskspace, payload, self.deadlines.delete_taskspace)
            .await
    }

    /// Fire-and-forget: no reply is awaited, late joiners see it via replay.
    fn log_progress(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let payload = self.with_self(input);
        let envelope = Envelope::new(MessageId::new(UuidIdGen.next()), Tag::LogProgress, payload);
        self.client.publish(envelope)?;
        Ok(serde_json::Value::Null)
    }

    fn signal_user(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let payload = self.with_self(input);
        let envelope = Envelope::new(MessageId::new(UuidIdGen.next()), Tag::SignalUser, payload);
        self.client.publish(envelope)?;
        Ok(serde_json::Value::Null)
    }

    async fn present_walkthrough(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        self.request_editor(Tag::PresentWalkthrough, input, self.deadlines.present_walkthrough)
            .await
    }

    async fn get_selection(&self) -> Result<serde_json::Value, ToolError> {
        self.request_editor(
            Tag::GetSelection,
            serde_json::Value::Null,
            self.deadlines.get_selection,
        )
        .await
    }

    async fn ide_operation(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        self.request_editor(Tag::IdeOperation, input, self.deadlines.ide_operation)
            .await
    }

    /// Pre-defined tokens resolve locally. Everything else is a directed
    /// request to the known producer, or a broadcast fallback if the
    /// producer hasn't been observed yet.
    async fn expand_reference(&self, input: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let token_str = input
            .get("token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::BadRequest("expand_reference requires a 'token' field".to_string()))?;
        let token = ReferenceToken::new(token_str);

        if self.references.is_predefined(&token) {
            return self.references.resolve(&token).ok_or(ToolError::NotFound);
        }

        let mut envelope = Envelope::new(
            MessageId::new(UuidIdGen.next()),
            Tag::ExpandReference,
            serde_json::json!({"token": token_str}),
        );
        if let Some(producer) = self.references.producer_of(&token) {
            envelope = envelope.with_addressee(Addressee::Peer(producer));
        }
        let reply = self
            .client
            .request(envelope, self.deadlines.expand_reference)
            .await?;
        Ok(reply.payload)
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
