// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Role registry backing [`Addressee`] resolution for Directed envelopes.
//!
//! Tool Servers and the Orchestrator address each other by role, not by raw
//! connection identity, so the broker keeps a small role→peer index. A peer
//! declares its role by including it on a `subscribe` control envelope; the
//! registry forgets a peer the moment it disconnects.

use std::collections::HashMap;
use symposium_core::{Addressee, PeerId, TaskspaceId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Orchestrator,
    Editor(TaskspaceId),
}

#[derive(Default)]
pub struct RoleRegistry {
    by_role: HashMap<Role, PeerId>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, role: Role, peer_id: PeerId) {
        self.by_role.insert(role, peer_id);
    }

    pub fn unregister_peer(&mut self, peer_id: &PeerId) {
        self.by_role.retain(|_, registered| registered != peer_id);
    }

    /// Resolve an addressee to the peer currently holding that role, if any.
    pub fn resolve(&self, addressee: &Addressee) -> Option<PeerId> {
        match addressee {
            Addressee::Orchestrator => self.by_role.get(&Role::Orchestrator).cloned(),
            Addressee::Editor { taskspace_id } => {
                self.by_role.get(&Role::Editor(taskspace_id.clone())).cloned()
            }
            Addressee::Peer(id) => Some(id.clone()),
        }
    }
}

#[cfg(test)]
#[path = "roles_tests.rs"]
mod tests;
