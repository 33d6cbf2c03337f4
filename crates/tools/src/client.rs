// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin request/reply client over a broker connection, for processes (the
//! Tool Server, the Orchestrator) that issue directed requests and need to
//! correlate the eventual reply — the same connect-and-split shape as the
//! broker's own per-connection tasks, but with a pending-request table
//! instead of routing logic on the receive side.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use symposium_core::{Envelope, MessageId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ToolError;

/// A connected, live handle onto the broker. Cloning shares the same
/// outbox and pending-reply table.
#[derive(Clone)]
pub struct BusClient {
    outbox: mpsc::UnboundedSender<Envelope>,
    pending: Arc<Mutex<HashMap<MessageId, oneshot::Sender<Envelope>>>>,
}

impl BusClient {
    /// Connect via the Acquirer-consult-then-retry lifecycle, then split
    /// the connection into a write task (drains `outbox`) and a read task
    /// (resolves pending requests by `correlationId`, and forwards every
    /// other envelope to `on_broadcast`).
    pub async fn connect<F>(
        config: symposium_bridge::Config,
        on_broadcast: F,
    ) -> Result<(Self, JoinHandle<()>), ToolError>
    where
        F: Fn(Envelope) + Send + Sync + 'static,
    {
        let stream = symposium_bridge::connect(&config).await?;
        let (read_half, mut write_half) = stream.into_split();
        let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<Envelope>();
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
        let read_task = tokio::spawn(read_loop(read_half, read_pending, on_broadcast));

        Ok((
            Self {
                outbox: outbox_tx,
                pending,
            },
            read_task,
        ))
    }

    /// Submit an envelope without waiting for a reply.
    pub fn publish(&self, envelope: Envelope) -> Result<(), ToolError> {
        self.outbox
            .send(envelope)
            .map_err(|_| ToolError::BadRequest("broker connection closed".to_string()))
    }

    /// Submit `envelope` and wait for the correlated reply, up to `deadline`.
    /// On expiry, the pending entry is dropped and any later reply is
    /// discarded by the read loop.
    pub async fn request(&self, envelope: Envelope, deadline: Duration) -> Result<Envelope, ToolError> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(envelope.id.clone(), tx);
        let request_id = envelope.id.clone();
        if let Err(error) = self.publish(envelope) {
            self.pending.lock().remove(&request_id);
            return Err(error);
        }
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(ToolError::Timeout),
            Err(_) => {
                self.pending.lock().remove(&request_id);
                Err(ToolError::Timeout)
            }
        }
    }
}

async fn write_envelope(
    write_half: &mut tokio::net::unix::OwnedWriteHalf,
    envelope: &Envelope,
) -> Result<(), ToolError> {
    let line = envelope.to_line()?;
    write_half.write_all(line.as_bytes()).await?;
    write_half.write_all(b"\n").await?;
    write_half.flush().await?;
    Ok(())
}

async fn read_loop<F>(
    read_half: tokio::net::unix::OwnedReadHalf,
    pending: Arc<Mutex<HashMap<MessageId, oneshot::Sender<Envelope>>>>,
    on_broadcast: F,
) where
    F: Fn(Envelope) + Send + Sync + 'static,
{
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
            None => on_broadcast(envelope),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
