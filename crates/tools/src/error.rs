// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use symposium_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// No ancestor directory matched the taskspace-identifier convention
    /// with a project manifest alongside it.
    #[error("could not resolve this process's taskspace identity from its working directory")]
    SelfIdentityNotFound,
    #[error("tool request timed out waiting for a reply")]
    Timeout,
    #[error("addressed peer or reference token was not found")]
    NotFound,
    #[error("request was malformed: {0}")]
    BadRequest(String),
    #[error("reference token {0} is already registered with different content")]
    ReferenceConflict(String),
    #[error(transparent)]
    Bridge(#[from] symposium_bridge::BridgeError),
    #[error("failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Map to the shared error-kind taxonomy carried on reply payloads.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::SelfIdentityNotFound => ErrorKind::ValidationError,
            ToolError::Timeout => ErrorKind::Timeout,
            ToolError::NotFound => ErrorKind::NotFound,
            ToolError::BadRequest(_) => ErrorKind::ProtocolViolation,
            ToolError::ReferenceConflict(_) => ErrorKind::StateConflict,
            ToolError::Bridge(_) | ToolError::Json(_) | ToolError::Io(_) => {
                ErrorKind::ProtocolViolation
            }
        }
    }
}
