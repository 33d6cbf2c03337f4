// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acquirer-consult-then-connect lifecycle for a bridge startup.

use tokio::net::UnixStream;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::BridgeError;
use crate::spawn::spawn_detached_daemon;

/// Consult the Acquirer; if no broker is reachable, spawn one detached and
/// retry connecting with bounded backoff.
///
/// When the Acquirer hands back a bound listener, it means this process
/// itself raced into leadership — but the bridge never wants to run the
/// broker loop, so the listener is dropped immediately. The detached
/// daemon it spawns races the same stale-endpoint recovery path the
/// Acquirer already implements (bind fails since the path still exists,
/// probe-connect fails since nothing is listening, the stale file is
/// removed, bind retried) so there's no hand-off protocol to get right.
pub async fn connect(config: &Config) -> Result<UnixStream, BridgeError> {
    match symposium_broker::acquire(&config.endpoint_path).await? {
        symposium_broker::Acquired::NoLeader => {}
        symposium_broker::Acquired::Broker(listener) => {
            drop(listener);
            info!(path = %config.endpoint_path.display(), "no broker reachable, spawning one");
            spawn_detached_daemon(&config.endpoint_path).map_err(BridgeError::Spawn)?;
        }
    }
    connect_with_backoff(config).await
}

async fn connect_with_backoff(config: &Config) -> Result<UnixStream, BridgeError> {
    let mut delay = config.initial_backoff;
    for attempt in 0..config.connect_attempts {
        match UnixStream::connect(&config.endpoint_path).await {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                warn!(attempt, %error, "connect attempt failed, retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_backoff);
            }
        }
    }
    Err(BridgeError::ConnectTimedOut)
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod tests;
