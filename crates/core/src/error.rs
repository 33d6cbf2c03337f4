// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared error taxonomy. Each crate's own `thiserror` enum
//! maps its variants onto the subset of these kinds it can produce; this
//! enum is what crosses the bus as a reply payload and what diagnostics
//! report by, so a caller on the other side of an envelope can match on a
//! stable tag regardless of which crate raised it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Another broker already holds the endpoint; caller should run as client.
    EndpointContention,
    /// Unrecoverable filesystem or permission failure on the endpoint.
    BindFailure,
    /// Malformed frame, oversized frame, or unknown required field.
    ProtocolViolation,
    /// An outbound envelope was discarded to honor a queue bound. Never
    /// surfaced to peers as an error reply — diagnostics only.
    DeliveryDropped,
    /// A Tool Server request was not answered within its deadline.
    Timeout,
    /// A directed envelope addressed a peer or token that does not exist.
    NotFound,
    /// Project or Taskspace manifest failed schema validation.
    ValidationError,
    /// Filesystem operation on the Project tree refused by the host.
    PermissionDenied,
    /// A request contradicts the current state machine.
    StateConflict,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
