// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection to the bus declaring the Orchestrator role: directed requests
//! addressed to Orchestrator reach it regardless of subscription narrowing
//! (the broker's role index resolves those independently of `Subscription`),
//! so only the broadcast tags it must react to need to be named here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use symposium_core::{Envelope, IdGen, MessageId, Tag, UuidIdGen};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::OrchestratorError;

/// A connected handle onto the broker, declaring the Orchestrator role.
/// Envelopes that don't resolve a pending request are forwarded on
/// `incoming`, for [`crate::engine::Engine`] to dispatch one at a time.
#[derive(Clone)]
pub struct OrchestratorBus {
    outbox: mpsc::UnboundedSender<Envelope>,
    pending: Arc<Mutex<HashMap<MessageId, oneshot::Sender<Envelope>>>>,
}

impl OrchestratorBus {
    pub async fn connect(
        config: symposium_bridge::Config,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Envelope>, JoinHandle<()>), OrchestratorError> {
        let stream = symposium_bridge::connect(&config).await?;
        let (read_half, mut write_half) = stream.into_split();

        let subscribe = Envelope::new(
            MessageId::new(UuidIdGen.next()),
            Tag::Subscribe,
            serde_json::json!({
                "types": ["log-progress", "signal-user", "register-taskspace-window"],
                "role": {"kind": "orchestrator"},
            }),
        );
        write_envelope(&mut write_half, &subscribe).await?;

        let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<Envelope>();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel::<Envelope>();
        let pending: Arc<Mutex<HashMap<MessageId, oneshot::Sender<Envelope>>>> =
            Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(async move {
            while let Some(envelope) = outbox_rx.recv().await {
                if let Err(error) = write_envelope(&mut write_half, &envelope).await {
                    warn!(%error, "failed to write to broker, stopping writer");
                    break;
                }
            }
        });

        let read_pending = Arc::clone(&pending);
        let read_task = tokio::spawn(read_loop(read_half, read_pending, incoming_tx));

        Ok((
            Self {
                outbox: outbox_tx,
                pending,
            },
            incoming_rx,
            read_task,
        ))
    }

    pub fn publish(&self, envelope: Envelope) -> Result<(), OrchestratorError> {
        self.outbox
            .send(envelope)
            .map_err(|_| OrchestratorError::Bridge(symposium_bridge::BridgeError::ConnectTimedOut))
    }

    /// Submit `envelope` and wait for its correlated reply, up to `deadline`
    /// — used for the delete-confirmation round trip with the UI.
    pub async fn request(&self, envelope: Envelope, deadline: Duration) -> Result<Envelope, OrchestratorError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(envelope.id.clone(), tx);
        let request_id = envelope.id.clone();
        if let Err(error) = self.publish(envelope) {
            self.pending.lock().remove(&request_id);
            return Err(error);
        }
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(OrchestratorError::Timeout),
            Err(_) => {
                self.pending.lock().remove(&request_id);
                Err(OrchestratorError::Timeout)
            }
        }
    }
}

async fn write_envelope(
    write_half: &mut tokio::net::unix::OwnedWriteHalf,
    envelope: &Envelope,
) -> Result<(), OrchestratorError> {
    let line = envelope.to_line()?;
    write_half.write_all(line.as_bytes()).await?;
    write_half.write_all(b"\n").await?;
    write_half.flush().await?;
    Ok(())
}

async fn read_loop(
    read_half: tokio::net::unix::OwnedReadHalf,
    pending: Arc<Mutex<HashMap<MessageId, oneshot::Sender<Envelope>>>>,
    incoming: mpsc::UnboundedSender<Envelope>,
) {
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("broker connection closed");
                return;
            }
            Ok(_) => {}
            Err(error) => {
                warn!(%error, "error reading from broker, stopping reader");
                return;
            }
        }
        let trimmed = line.trim_end_matches('\n');
        if trimmed.is_empty() {
            continue;
        }
        let envelope: Envelope = match Envelope::from_line(trimmed) {
            Ok(envelope) => envelope,
            Err(error) => {
                debug!(%error, "dropping malformed broker line");
                continue;
            }
        };

        let correlated = envelope
            .correlation_id
            .as_ref()
            .and_then(|id| pending.lock().remove(id));

        match correlated {
            Some(waiter) => {
                let _ = waiter.send(envelope);
            }
            None => {
                let _ = incoming.send(envelope);
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
