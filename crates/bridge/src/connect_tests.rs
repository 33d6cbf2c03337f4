// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn test_config(endpoint_path: std::path::PathBuf) -> Config {
    Config {
        endpoint_path,
        connect_attempts: 5,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
        ..Config::default()
    }
}

#[tokio::test]
async fn connects_immediately_when_broker_already_listening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symposium.sock");
    let _listener = tokio::net::UnixListener::bind(&path).unwrap();

    let config = test_config(path);
    connect_with_backoff(&config).await.unwrap();
}

#[tokio::test]
async fn gives_up_after_the_retry_budget_with_nobody_listening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symposium.sock");

    let config = test_config(path);
    let result = connect_with_backoff(&config).await;
    assert!(matches!(result, Err(BridgeError::ConnectTimedOut)));
}

#[tokio::test]
async fn retries_until_a_listener_shows_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symposium.sock");
    let config = test_config(path.clone());

    let spawn_path = path.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        let _listener = tokio::net::UnixListener::bind(&spawn_path).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
    });

    connect_with_backoff(&config).await.unwrap();
}
