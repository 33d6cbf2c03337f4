// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use symposium_core::Tag;
use tokio::io::AsyncBufReadExt as _;
use tokio::sync::mpsc as test_mpsc;

fn test_config(endpoint_path: std::path::PathBuf) -> symposium_bridge::Config {
    symposium_bridge::Config {
        endpoint_path,
        connect_attempts: 5,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
        ..symposium_bridge::Config::default()
    }
}

#[tokio::test]
async fn request_is_resolved_by_its_correlated_reply() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symposium.sock");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = tokio::io::BufReader::new(read_half);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let request = Envelope::from_line(line.trim_end()).unwrap();
        let reply = Envelope::new(
            MessageId::new("reply-1"),
            Tag::DeleteResponse,
            serde_json::json!({"status": "ok"}),
        )
        .with_correlation(request.id);
        write_half
            .write_all(format!("{}\n", reply.to_line().unwrap()).as_bytes())
            .await
            .unwrap();
    });

    let (client, _read_task) = BusClient::connect(test_config(path), |_| {}).await.unwrap();
    let request = Envelope::new(
        MessageId::new("req-1"),
        Tag::DeleteTaskspace,
        serde_json::json!({}),
    );
    let reply = client.request(request, Duration::from_secs(2)).await.unwrap();
    assert_eq!(reply.payload, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn request_without_a_reply_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symposium.sock");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();

    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let (client, _read_task) = BusClient::connect(test_config(path), |_| {}).await.unwrap();
    let request = Envelope::new(
        MessageId::new("req-1"),
        Tag::DeleteTaskspace,
        serde_json::json!({}),
    );
    let result = client.request(request, Duration::from_millis(50)).await;
    assert!(matches!(result, Err(ToolError::Timeout)));
}

#[tokio::test]
async fn uncorrelated_envelopes_are_forwarded_to_the_broadcast_callback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symposium.sock");
    let listener = tokio::net::UnixListener::bind(&path).unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (_read_half, mut write_half) = stream.into_split();
        let broadcast = Envelope::new(
            MessageId::new("bcast-1"),
            Tag::TaskspaceUpdated,
            serde_json::json!({"name": "demo"}),
        );
        write_half
            .write_all(format!("{}\n", broadcast.to_line().unwrap()).as_bytes())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let (tx, mut rx) = test_mpsc::unbounded_channel();
    let (_client, _read_task) = BusClient::connect(test_config(path), move |envelope| {
        let _ = tx.send(envelope);
    })
    .await
    .unwrap();

    let received = rx.recv().await.unwrap();
    assert_eq!(received.tag, Tag::TaskspaceUpdated);
}
