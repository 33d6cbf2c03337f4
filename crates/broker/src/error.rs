// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

pub use crate::acquirer::AcquireError;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Acquire(#[from] AcquireError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a connection is dropped.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("malformed envelope on line: {0}")]
    MalformedFrame(serde_json::Error),
    #[error("frame exceeded maximum size of {max} bytes")]
    FrameTooLarge { max: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
