// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

pub use symposium_broker::AcquireError;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error("failed to spawn detached broker: {0}")]
    Spawn(std::io::Error),
    #[error("could not connect to the broker within the retry budget")]
    ConnectTimedOut,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode envelope: {0}")]
    Encode(serde_json::Error),
    #[error("bridge task panicked: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
