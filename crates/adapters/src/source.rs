// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source-materialization adapter backing Taskspace spawn.
//!
//! Cloning and worktree creation are external collaborators: the
//! Orchestrator only needs a directory to exist at the end of this call, it
//! never inspects what's inside.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to materialize source: {0}")]
    Io(#[from] std::io::Error),
}

/// Materializes a Taskspace's working tree at `destination`.
#[async_trait]
pub trait SourceAdapter: Clone + Send + Sync + 'static {
    async fn materialize(
        &self,
        destination: &Path,
        source_repository: &str,
        branch: &str,
    ) -> Result<(), SourceError>;
}

/// Source adapter that only creates the destination directory. Used until a
/// real VCS integration is wired in; also the correct behavior for a
/// collaborator-role spawn where the caller has already checked out the
/// branch itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSourceAdapter;

impl NoOpSourceAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceAdapter for NoOpSourceAdapter {
    async fn materialize(
        &self,
        destination: &Path,
        _source_repository: &str,
        _branch: &str,
    ) -> Result<(), SourceError> {
        tokio::fs::create_dir_all(destination).await?;
        Ok(())
    }
}

/// Recorded materialize call.
#[derive(Debug, Clone)]
pub struct MaterializeCall {
    pub destination: std::path::PathBuf,
    pub source_repository: String,
    pub branch: String,
}

struct FakeSourceState {
    calls: Vec<MaterializeCall>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Clone)]
pub struct FakeSourceAdapter {
    inner: Arc<Mutex<FakeSourceState>>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeSourceAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSourceState { calls: Vec::new() })),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl FakeSourceAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<MaterializeCall> {
        self.inner.lock().calls.clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl SourceAdapter for FakeSourceAdapter {
    async fn materialize(
        &self,
        destination: &Path,
        source_repository: &str,
        branch: &str,
    ) -> Result<(), SourceError> {
        tokio::fs::create_dir_all(destination).await?;
        self.inner.lock().calls.push(MaterializeCall {
            destination: destination.to_path_buf(),
            source_repository: source_repository.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
