// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use symposium_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("project manifest failed schema validation: {0}")]
    ValidationError(String),
    #[error("taskspace {0} not found")]
    NotFound(String),
    #[error("request contradicts current state: {0}")]
    StateConflict(String),
    #[error("filesystem operation refused: {0}")]
    PermissionDenied(std::io::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Bridge(#[from] symposium_bridge::BridgeError),
    #[error("orchestrator bus request timed out")]
    Timeout,
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::ValidationError(_) => ErrorKind::ValidationError,
            OrchestratorError::NotFound(_) => ErrorKind::NotFound,
            OrchestratorError::StateConflict(_) => ErrorKind::StateConflict,
            OrchestratorError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            OrchestratorError::Timeout => ErrorKind::Timeout,
            OrchestratorError::Io(error) => io_error_kind(error),
            OrchestratorError::Json(_) | OrchestratorError::Bridge(_) => ErrorKind::ProtocolViolation,
        }
    }
}

fn io_error_kind(error: &std::io::Error) -> ErrorKind {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        ErrorKind::PermissionDenied
    } else {
        ErrorKind::ValidationError
    }
}
