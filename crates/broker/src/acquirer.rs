// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Endpoint Acquirer: single-leader election on a shared filesystem
//! endpoint, with no coordination service beyond the bind itself.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::net::UnixListener;

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("bind failed at {path}: {source}")]
    BindFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove stale endpoint at {path}: {source}")]
    StaleRemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of [`acquire`].
pub enum Acquired {
    /// This process bound the endpoint and is now the broker.
    Broker(UnixListener),
    /// Another process holds the endpoint; connect as a peer instead.
    NoLeader,
}

/// Short timeout for the probe connect used to distinguish a live broker
/// from a stale endpoint left by a crashed one.
const PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// Bind-or-probe-connect election:
/// 1. Attempt to bind.
/// 2. If bind succeeds, restrict permissions and return the listener.
/// 3. If bind fails, probe-connect. Success → no-leader. Failure → remove
///    the stale endpoint and retry (exactly once).
/// 4. Abort after two bind attempts.
pub async fn acquire(path: &Path) -> Result<Acquired, AcquireError> {
    for attempt in 0..2 {
        match UnixListener::bind(path) {
            Ok(listener) => {
                restrict_permissions(path);
                return Ok(Acquired::Broker(listener));
            }
            Err(bind_err) if bind_err.kind() == std::io::ErrorKind::AddrInUse => {
                if probe_connect(path).await {
                    return Ok(Acquired::NoLeader);
                }

                // Stale endpoint: nobody answers. Remove and retry once.
                if attempt == 0 {
                    if let Err(source) = tokio::fs::remove_file(path).await {
                        if source.kind() != std::io::ErrorKind::NotFound {
                            return Err(AcquireError::StaleRemoveFailed {
                                path: path.to_path_buf(),
                                source,
                            });
                        }
                    }
                    continue;
                }

                return Err(AcquireError::BindFailure {
                    path: path.to_path_buf(),
                    source: bind_err,
                });
            }
            Err(source) => {
                return Err(AcquireError::BindFailure {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    Err(AcquireError::BindFailure {
        path: path.to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
    })
}

async fn probe_connect(path: &Path) -> bool {
    tokio::time::timeout(PROBE_TIMEOUT, tokio::net::UnixStream::connect(path))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(metadata) = std::fs::metadata(path) {
        let mut perms = metadata.permissions();
        perms.set_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
#[path = "acquirer_tests.rs"]
mod tests;
