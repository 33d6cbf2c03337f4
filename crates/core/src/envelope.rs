// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The envelope carried on the bus.

use crate::id::{MessageId, PeerId, TaskspaceId};
use crate::tag::Tag;
use serde::{Deserialize, Serialize};

/// Descriptor of which peer produced an envelope.
///
/// Assigned by the broker on ingress from the connection the envelope
/// arrived on; a peer cannot forge another peer's origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub peer_id: PeerId,
}

/// Well-known roles a Directed envelope can be addressed to.
///
/// Directed envelopes carry an addressee, but Tool Servers and the
/// Orchestrator don't learn each other's raw [`PeerId`]s, so addressing is
/// by role rather than by connection identity; the broker maintains a
/// role→peer index populated by a `subscribe` control envelope that
/// declares a role (see `crates/broker`). A role with nobody currently
/// registered behaves like an unreachable peer: the envelope is dropped,
/// same as the Reply class with no matching peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Addressee {
    /// The single Orchestrator State Engine instance for this broker.
    Orchestrator,
    /// The editor peer registered for a given Taskspace.
    Editor { taskspace_id: TaskspaceId },
    /// A specific connected peer, used when the requester already knows it
    /// (e.g. replying is handled by correlation, not this variant — this is
    /// reserved for the rare case a producer's peer identity is already
    /// known from a prior exchange).
    Peer(PeerId),
}

/// One message on the bus. Immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: MessageId,
    #[serde(rename = "type")]
    pub tag: Tag,
    #[serde(rename = "correlationId", default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    /// Addressee for Directed envelopes. `None` for Directed tags means
    /// "broadcast this one and let the recognizing peer reply" — the
    /// fallback mode reference expansion uses when the producer isn't known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addressee: Option<Addressee>,
    /// Broker-assigned monotonic sequence number. Absent on submission,
    /// always present on delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Build an envelope ready for submission to the broker (no `seq`, no
    /// `origin` — the broker fills those in on ingress).
    pub fn new(id: MessageId, tag: Tag, payload: serde_json::Value) -> Self {
        Self {
            id,
            tag,
            correlation_id: None,
            origin: None,
            addressee: None,
            seq: None,
            payload,
        }
    }

    pub fn with_correlation(mut self, correlation_id: MessageId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_addressee(mut self, addressee: Addressee) -> Self {
        self.addressee = Some(addressee);
        self
    }

    /// Serialize as a single newline-delimited JSON line, without the
    /// trailing newline.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse one line of newline-delimited JSON into an envelope.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
