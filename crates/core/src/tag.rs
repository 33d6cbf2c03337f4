// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed type-tag registry carried on every envelope, and the routing
//! classification derived from it.
//!
//! The registry is closed: unknown tags on the wire are preserved as
//! [`Tag::Custom`] rather than rejected, so a peer running an older or
//! newer build doesn't bring the whole bus down, but the broker's routing
//! and replay decisions only ever recognize the tags enumerated here.

use serde::{Deserialize, Serialize};

/// A message type tag from the closed registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    // -- taskspace lifecycle --
    SpawnTaskspace,
    UpdateTaskspace,
    DeleteTaskspace,
    TaskspaceUpdated,
    TaskspaceRollCall,
    RegisterTaskspaceWindow,
    DeleteResponse,

    // -- agent signaling --
    LogProgress,
    SignalUser,

    // -- editor operations --
    GetSelection,
    IdeOperation,
    PresentWalkthrough,
    StoreReference,
    ExpandReference,

    // -- control --
    Subscribe,
    Heartbeat,
    Log,

    /// Any tag not in the closed registry. Carried through so a mixed-version
    /// bus degrades rather than fails, but never participates in routing
    /// classification beyond best-effort broadcast.
    #[serde(other)]
    Custom,
}

/// How the broker distributes an envelope of a given tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingClass {
    /// Delivered to every currently-connected peer.
    Broadcast { self_suppressed: bool },
    /// Delivered only to the peer matching the envelope's addressee.
    Directed,
    /// Delivered only to the peer that originated the correlated request.
    Reply,
}

impl Tag {
    /// Routing class for this tag.
    pub fn routing_class(&self) -> RoutingClass {
        use Tag::*;
        match self {
            SpawnTaskspace | UpdateTaskspace | DeleteTaskspace => RoutingClass::Directed,
            TaskspaceUpdated => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            TaskspaceRollCall => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            RegisterTaskspaceWindow => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            DeleteResponse => RoutingClass::Reply,
            LogProgress => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            SignalUser => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            GetSelection | IdeOperation | PresentWalkthrough => RoutingClass::Directed,
            StoreReference => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            ExpandReference => RoutingClass::Directed,
            Subscribe => RoutingClass::Broadcast {
                self_suppressed: true,
            },
            Heartbeat => RoutingClass::Broadcast {
                self_suppressed: true,
            },
            Log => RoutingClass::Broadcast {
                self_suppressed: false,
            },
            Custom => RoutingClass::Broadcast {
                self_suppressed: false,
            },
        }
    }

    /// Whether envelopes of this tag belong to the replayable set: taskspace
    /// progress updates, window-registration events, roll-call requests, and
    /// orchestrator state-change notifications.
    pub fn is_replayable(&self) -> bool {
        matches!(
            self,
            Tag::LogProgress
                | Tag::RegisterTaskspaceWindow
                | Tag::TaskspaceRollCall
                | Tag::TaskspaceUpdated
        )
    }
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
