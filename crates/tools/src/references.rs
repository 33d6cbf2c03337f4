// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reference table backing "Expand reference": a small pre-defined set
//! of bundled guidance documents selected by agent role, plus whatever
//! tokens this process has observed registered on the bus.

use std::collections::HashMap;

use parking_lot::Mutex;
use symposium_core::{Envelope, PeerId, ReferenceToken, Tag};

use crate::error::ToolError;

/// Environment variable selecting which guidance bundle is pre-loaded.
pub const AGENT_ROLE_VAR: &str = "SYMPOSIUM_AGENT_ROLE";

fn predefined_bundle(role: &str) -> Vec<(&'static str, &'static str)> {
    match role {
        "reviewer" => vec![
            (
                "guidance:getting-started",
                "You are reviewing changes in this taskspace. Read the diff before commenting.",
            ),
            (
                "guidance:review-checklist",
                "Check correctness, security, and test coverage before approving.",
            ),
        ],
        _ => vec![
            (
                "guidance:getting-started",
                "You are an implementer working in this taskspace. Use log-progress to narrate.",
            ),
            (
                "guidance:tool-catalog",
                "Available tools: spawn/update/delete taskspace, log progress, signal user, \
                 present walkthrough, get selection, IDE operation, expand reference.",
            ),
        ],
    }
}

/// Resolves reference tokens: the bundled guidance set first, then whatever
/// has been registered dynamically on the bus via `store-reference`.
pub struct ReferenceTable {
    predefined: HashMap<ReferenceToken, serde_json::Value>,
    registered: Mutex<HashMap<ReferenceToken, serde_json::Value>>,
    producers: Mutex<HashMap<ReferenceToken, PeerId>>,
}

impl ReferenceTable {
    pub fn for_role(role: &str) -> Self {
        let predefined = predefined_bundle(role)
            .into_iter()
            .map(|(token, text)| (ReferenceToken::new(token), serde_json::json!({"text": text})))
            .collect();
        Self {
            predefined,
            registered: Mutex::new(HashMap::new()),
            producers: Mutex::new(HashMap::new()),
        }
    }

    /// Load the bundle selected by [`AGENT_ROLE_VAR`], defaulting to the
    /// implementer bundle if unset.
    pub fn from_env() -> Self {
        let role = std::env::var(AGENT_ROLE_VAR).unwrap_or_default();
        Self::for_role(&role)
    }

    /// Record a `(token, content)` registration observed on the bus,
    /// produced by `producer`. A no-op if already registered with identical
    /// content; an error if the content differs.
    pub fn observe_registration(
        &self,
        token: ReferenceToken,
        content: serde_json::Value,
        producer: PeerId,
    ) -> Result<(), ToolError> {
        let mut registered = self.registered.lock();
        match registered.get(&token) {
            Some(existing) if *existing == content => Ok(()),
            Some(_) => Err(ToolError::ReferenceConflict(token.as_str().to_string())),
            None => {
                registered.insert(token.clone(), content);
                self.producers.lock().insert(token, producer);
                Ok(())
            }
        }
    }

    /// Resolve a token, checking the pre-defined bundle first.
    pub fn resolve(&self, token: &ReferenceToken) -> Option<serde_json::Value> {
        if let Some(content) = self.predefined.get(token) {
            return Some(content.clone());
        }
        self.registered.lock().get(token).cloned()
    }

    /// Whether `token` is handled entirely locally, without a bus round trip.
    pub fn is_predefined(&self, token: &ReferenceToken) -> bool {
        self.predefined.contains_key(token)
    }

    /// The peer known to have produced `token`, if one has been observed.
    pub fn producer_of(&self, token: &ReferenceToken) -> Option<PeerId> {
        self.producers.lock().get(token).cloned()
    }

    /// Feed a broadcast envelope received from the bus; records any
    /// `store-reference` registration it carries. Ignores everything else.
    pub fn observe_envelope(&self, envelope: &Envelope) {
        if envelope.tag != Tag::StoreReference {
            return;
        }
        let Some(origin) = envelope.origin.as_ref() else {
            return;
        };
        let (Some(token), Some(content)) = (
            envelope.payload.get("token").and_then(|v| v.as_str()),
            envelope.payload.get("content"),
        ) else {
            return;
        };
        let _ = self.observe_registration(ReferenceToken::new(token), content.clone(), origin.peer_id.clone());
    }
}

#[cfg(test)]
#[path = "references_tests.rs"]
mod tests;
