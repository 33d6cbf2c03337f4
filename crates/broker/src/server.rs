// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Broker Core: accept loop, ingress routing, replay, and idle shutdown.
//!
//! Every piece of shared state — peers, the replay buffer, the role
//! registry, the sequence counter — is owned exclusively by [`BrokerCore`],
//! which runs on a single task and is fed by a channel. A connection gets
//! its own read task (parsing incoming lines and forwarding them to the
//! core) and write task (draining its outbound queue), the same split the
//! daemon's listener uses, but every *decision* about where an envelope
//! goes is made by one task processing one message at a time, so the
//! sequence counter and routing order are never contended.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use symposium_core::{
    Addressee, Clock, Envelope, MessageId, Origin, PeerId, RoutingClass, Tag, TaskspaceId,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, Notify};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::BrokerError;
use crate::peer::{OutboundQueueReceiver, Peer, Subscription};
use crate::replay::ReplayBuffer;
use crate::roles::{Role, RoleRegistry};

/// Extra field recognized on a `subscribe` control envelope, letting the
/// Orchestrator or an editor peer declare the role it answers to for
/// Directed addressing. Everything else about `subscribe` is the narrowing
/// of broadcast types the broker describes on its own.
#[derive(Debug, Deserialize, Default)]
struct SubscribeRequest {
    #[serde(default)]
    types: Option<Vec<Tag>>,
    #[serde(default)]
    role: Option<RoleDeclaration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
enum RoleDeclaration {
    Orchestrator,
    Editor { taskspace_id: TaskspaceId },
}

enum CoreMsg {
    Connected { peer_id: PeerId, peer: Peer },
    Disconnected { peer_id: PeerId },
    Envelope { peer_id: PeerId, envelope: Envelope },
}

const MAX_PENDING_REPLIES: usize = 4096;

/// Everything the broker needs to route one envelope correctly. Reachable
/// only from [`run_core`] — no mutex, because nothing else ever touches it.
struct BrokerCore {
    peers: HashMap<PeerId, Peer>,
    replay: ReplayBuffer,
    roles: RoleRegistry,
    clock: Arc<dyn Clock>,
    next_seq: u64,
    pending_replies: HashMap<MessageId, PeerId>,
    pending_order: VecDeque<MessageId>,
    empty_since_ms: Option<u64>,
}

impl BrokerCore {
    fn new(clock: Arc<dyn Clock>, replay: ReplayBuffer) -> Self {
        let empty_since_ms = Some(clock.now_ms());
        Self {
            peers: HashMap::new(),
            replay,
            roles: RoleRegistry::new(),
            clock,
            next_seq: 0,
            pending_replies: HashMap::new(),
            pending_order: VecDeque::new(),
            empty_since_ms,
        }
    }

    /// Accept a new peer: register it and, before any live traffic, replay
    /// everything buffered for the subscription it starts with.
    fn on_connect(&mut self, peer_id: PeerId, mut peer: Peer) {
        let snapshot = self.replay.snapshot_for(|tag| peer.subscription.accepts(tag));
        for envelope in snapshot {
            peer.enqueue(envelope);
        }
        self.peers.insert(peer_id, peer);
        self.empty_since_ms = None;
    }

    fn on_disconnect(&mut self, peer_id: PeerId) {
        self.peers.remove(&peer_id);
        self.roles.unregister_peer(&peer_id);
        if self.peers.is_empty() {
            self.empty_since_ms = Some(self.clock.now_ms());
        }
    }

    fn apply_subscription(&mut self, peer_id: &PeerId, envelope: &Envelope) {
        let request: SubscribeRequest = match serde_json::from_value(envelope.payload.clone()) {
            Ok(request) => request,
            Err(error) => {
                warn!(peer = %peer_id, %error, "malformed subscribe payload, ignoring");
                return;
            }
        };

        if let Some(types) = request.types {
            if let Some(peer) = self.peers.get_mut(peer_id) {
                peer.subscription = Subscription::Only(types.into_iter().collect());
            }
        }

        match request.role {
            Some(RoleDeclaration::Orchestrator) => {
                self.roles.register(Role::Orchestrator, peer_id.clone());
            }
            Some(RoleDeclaration::Editor { taskspace_id }) => {
                self.roles.register(Role::Editor(taskspace_id), peer_id.clone());
            }
            None => {}
        }
    }

    /// Ingress processing for one envelope: stamp, classify, fan out,
    /// buffer if replayable.
    fn process_envelope(&mut self, origin_peer: PeerId, mut envelope: Envelope) {
        envelope.origin = Some(Origin {
            peer_id: origin_peer.clone(),
        });
        envelope.seq = Some(self.next_seq);
        self.next_seq += 1;

        if envelope.tag == Tag::Subscribe {
            self.apply_subscription(&origin_peer, &envelope);
        }

        match envelope.tag.routing_class() {
            RoutingClass::Broadcast { self_suppressed } => {
                for (pid, peer) in self.peers.iter_mut() {
                    if self_suppressed && *pid == origin_peer {
                        continue;
                    }
                    if peer.subscription.accepts(&envelope.tag) {
                        peer.enqueue(envelope.clone());
                    }
                }
            }
            RoutingClass::Directed => match envelope.addressee.clone() {
                Some(addressee) => {
                    if let Some(target) = self.roles.resolve(&addressee) {
                        if let Some(peer) = self.peers.get_mut(&target) {
                            peer.enqueue(envelope.clone());
                        }
                    }
                }
                // No addressee: broadcast and let whichever peer recognizes
                // the request reply (the fallback reference expansion uses
                // when the producer's identity isn't known to the asker).
                None => {
                    for (pid, peer) in self.peers.iter_mut() {
                        if *pid == origin_peer {
                            continue;
                        }
                        if peer.subscription.accepts(&envelope.tag) {
                            peer.enqueue(envelope.clone());
                        }
                    }
                }
            },
            RoutingClass::Reply => {
                if let Some(correlation_id) = envelope.correlation_id.clone() {
                    if let Some(target) = self.pending_replies.get(&correlation_id).cloned() {
                        if let Some(peer) = self.peers.get_mut(&target) {
                            peer.enqueue(envelope.clone());
                        }
                    }
                }
            }
        }

        if envelope.tag.is_replayable() {
            self.replay.append(envelope.clone(), self.clock.now_ms());
        }

        self.remember_for_reply(envelope.id.clone(), origin_peer);
    }

    fn remember_for_reply(&mut self, id: MessageId, origin: PeerId) {
        if self.pending_replies.len() >= MAX_PENDING_REPLIES {
            if let Some(oldest) = self.pending_order.pop_front() {
                self.pending_replies.remove(&oldest);
            }
        }
        self.pending_order.push_back(id.clone());
        self.pending_replies.insert(id, origin);
    }

    /// Whether every peer has been gone for at least `quiet`, the idle
    /// shutdown condition.
    fn idle_for_at_least(&mut self, quiet: Duration) -> bool {
        if !self.peers.is_empty() {
            return false;
        }
        let now = self.clock.now_ms();
        match self.empty_since_ms {
            Some(since) => now.saturating_sub(since) >= quiet.as_millis() as u64,
            None => {
                self.empty_since_ms = Some(now);
                false
            }
        }
    }
}

async fn run_core(
    mut core: BrokerCore,
    mut rx: mpsc::UnboundedReceiver<CoreMsg>,
    quiet_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut idle_check = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Some(CoreMsg::Connected { peer_id, peer }) => core.on_connect(peer_id, peer),
                    Some(CoreMsg::Disconnected { peer_id }) => core.on_disconnect(peer_id),
                    Some(CoreMsg::Envelope { peer_id, envelope }) => {
                        core.process_envelope(peer_id, envelope)
                    }
                    None => break,
                }
            }
            _ = idle_check.tick() => {
                if core.idle_for_at_least(quiet_interval) {
                    info!("no peers connected for the quiet interval, shutting down");
                    shutdown.notify_one();
                    break;
                }
            }
        }
    }
}

async fn read_loop(
    read_half: OwnedReadHalf,
    peer_id: PeerId,
    core_tx: &mpsc::UnboundedSender<CoreMsg>,
    max_line_bytes: usize,
) {
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    loop {
        line.clear();
        let read = match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(error) => {
                warn!(peer = %peer_id, %error, "read error, disconnecting");
                break;
            }
        };
        if read > max_line_bytes {
            warn!(peer = %peer_id, read, max_line_bytes, "frame too large, disconnecting");
            break;
        }
        let trimmed = line.trim_end_matches('\n');
        if trimmed.is_empty() {
            continue;
        }
        match Envelope::from_line(trimmed) {
            Ok(envelope) => {
                if core_tx
                    .send(CoreMsg::Envelope {
                        peer_id: peer_id.clone(),
                        envelope,
                    })
                    .is_err()
                {
                    break;
                }
            }
            Err(error) => {
                debug!(peer = %peer_id, %error, "dropping malformed envelope");
            }
        }
    }
}

async fn write_loop(mut write_half: OwnedWriteHalf, mut receiver: OutboundQueueReceiver) {
    while let Some(batch) = receiver.recv_batch().await {
        for envelope in &batch {
            let line = match envelope.to_line() {
                Ok(line) => line,
                Err(error) => {
                    error!(%error, "failed to serialize outbound envelope");
                    continue;
                }
            };
            if write_half.write_all(line.as_bytes()).await.is_err() {
                return;
            }
            if write_half.write_all(b"\n").await.is_err() {
                return;
            }
        }
        if write_half.flush().await.is_err() {
            return;
        }
    }
}

async fn handle_connection(
    stream: tokio::net::UnixStream,
    peer_id: PeerId,
    core_tx: mpsc::UnboundedSender<CoreMsg>,
    max_line_bytes: usize,
) {
    let (peer, receiver) = Peer::new(peer_id.clone());
    if core_tx
        .send(CoreMsg::Connected {
            peer_id: peer_id.clone(),
            peer,
        })
        .is_err()
    {
        return;
    }

    let (read_half, write_half) = stream.into_split();
    let write_task = tokio::spawn(write_loop(write_half, receiver));

    read_loop(read_half, peer_id.clone(), &core_tx, max_line_bytes).await;

    let _ = core_tx.send(CoreMsg::Disconnected { peer_id });
    write_task.abort();
}

/// Run the broker to completion: accept connections, route envelopes, and
/// exit cleanly (removing the endpoint) on idle timeout or termination
/// signal.
pub async fn run(
    listener: UnixListener,
    endpoint_path: PathBuf,
    config: Config,
    clock: Arc<dyn Clock>,
) -> Result<(), BrokerError> {
    let (core_tx, core_rx) = mpsc::unbounded_channel::<CoreMsg>();
    let shutdown = Arc::new(Notify::new());
    let core = BrokerCore::new(Arc::clone(&clock), ReplayBuffer::new(config.replay_bounds));
    let core_task = tokio::spawn(run_core(
        core,
        core_rx,
        config.quiet_interval,
        Arc::clone(&shutdown),
    ));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let next_peer_id = AtomicU64::new(1);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let peer_id = PeerId::new(next_peer_id.fetch_add(1, Ordering::SeqCst));
                        let core_tx = core_tx.clone();
                        let max_line_bytes = config.max_line_bytes;
                        tokio::spawn(handle_connection(stream, peer_id, core_tx, max_line_bytes));
                    }
                    Err(error) => error!(%error, "accept failed"),
                }
            }
            _ = shutdown.notified() => break,
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    drop(core_tx);
    let _ = core_task.await;
    let _ = std::fs::remove_file(&endpoint_path);
    Ok(())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
