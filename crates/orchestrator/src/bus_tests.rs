// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use symposium_core::Tag;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _};

async fn connected_bus(
    path: std::path::PathBuf,
) -> (
    OrchestratorBus,
    mpsc::UnboundedReceiver<Envelope>,
    tokio::net::UnixStream,
) {
    let listener = tokio::net::UnixListener::bind(&path).unwrap();
    let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });

    let config = symposium_bridge::Config {
        endpoint_path: path,
        connect_attempts: 5,
        initial_backoff: std::time::Duration::from_millis(5),
        max_backoff: std::time::Duration::from_millis(20),
        ..symposium_bridge::Config::default()
    };
    let (bus, incoming, _read_task) = OrchestratorBus::connect(config).await.unwrap();
    let server_side = accept.await.unwrap();
    (bus, incoming, server_side)
}

#[tokio::test]
async fn connect_declares_the_orchestrator_role_on_subscribe() {
    let dir = tempfile::tempdir().unwrap();
    let (_bus, _incoming, server_side) = connected_bus(dir.path().join("sock")).await;

    let mut reader = tokio::io::BufReader::new(server_side);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    let envelope = Envelope::from_line(line.trim_end()).unwrap();
    assert_eq!(envelope.tag, Tag::Subscribe);
    assert_eq!(envelope.payload["role"]["kind"], "orchestrator");
}

#[tokio::test]
async fn uncorrelated_envelopes_are_forwarded_on_incoming() {
    let dir = tempfile::tempdir().unwrap();
    let (_bus, mut incoming, mut server_side) = connected_bus(dir.path().join("sock")).await;

    let mut reader = tokio::io::BufReader::new(&mut server_side);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap(); // drain the subscribe

    let broadcast = Envelope::new(MessageId::new("b1"), Tag::LogProgress, serde_json::json!({"msg": "hi"}));
    server_side
        .write_all(format!("{}\n", broadcast.to_line().unwrap()).as_bytes())
        .await
        .unwrap();

    let received = incoming.recv().await.unwrap();
    assert_eq!(received.id, MessageId::new("b1"));
}

#[tokio::test]
async fn request_resolves_on_correlated_reply() {
    let dir = tempfile::tempdir().unwrap();
    let (bus, _incoming, mut server_side) = connected_bus(dir.path().join("sock")).await;

    let (read_half, mut write_half) = server_side.into_split();
    let mut reader = tokio::io::BufReader::new(read_half);
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap(); // drain the subscribe

    let responder = tokio::spawn(async move {
        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();
        let request = Envelope::from_line(request_line.trim_end()).unwrap();
        let reply = Envelope::new(MessageId::new("reply-1"), Tag::DeleteResponse, serde_json::json!({"ok": true}))
            .with_correlation(request.id);
        write_half
            .write_all(format!("{}\n", reply.to_line().unwrap()).as_bytes())
            .await
            .unwrap();
    });

    let request = Envelope::new(MessageId::new("req-1"), Tag::DeleteTaskspace, serde_json::json!({}));
    let reply = bus.request(request, std::time::Duration::from_secs(1)).await.unwrap();
    assert_eq!(reply.payload["ok"], true);
    responder.await.unwrap();
}

#[tokio::test]
async fn request_times_out_with_no_reply() {
    let dir = tempfile::tempdir().unwrap();
    let (bus, _incoming, _server_side) = connected_bus(dir.path().join("sock")).await;

    let request = Envelope::new(MessageId::new("req-2"), Tag::DeleteTaskspace, serde_json::json!({}));
    let result = bus.request(request, std::time::Duration::from_millis(50)).await;
    assert!(matches!(result, Err(OrchestratorError::Timeout)));
}
