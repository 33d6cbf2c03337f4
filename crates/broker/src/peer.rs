// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer state held by the broker event loop.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use symposium_core::{Envelope, PeerId, Tag};
use tokio::sync::mpsc;

/// Maximum number of envelopes queued for a single peer before the oldest
/// is dropped.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// What a peer currently wants to receive.
#[derive(Debug, Clone)]
pub enum Subscription {
    /// Implicit default until a `subscribe` control envelope narrows it.
    AllBroadcast,
    Only(HashSet<Tag>),
}

impl Subscription {
    pub fn accepts(&self, tag: &Tag) -> bool {
        match self {
            Subscription::AllBroadcast => true,
            Subscription::Only(tags) => tags.contains(tag),
        }
    }
}

/// Bounded, drop-oldest-on-overflow outbound queue shared between the
/// broker's routing logic (producer) and the per-peer write task
/// (consumer). A plain `mpsc` channel drops the newest item on overflow,
/// not the oldest, so the queue itself is a mutex-guarded `VecDeque` woken
/// by a capacity-1 notify channel — the same non-blocking-wake shape the
/// write-ahead log's event bus uses for its producer/consumer handoff.
#[derive(Clone)]
pub struct OutboundQueue {
    inner: Arc<Mutex<VecDeque<Envelope>>>,
    wake_tx: mpsc::Sender<()>,
}

pub struct OutboundQueueReceiver {
    inner: Arc<Mutex<VecDeque<Envelope>>>,
    wake_rx: mpsc::Receiver<()>,
}

impl OutboundQueue {
    pub fn new() -> (Self, OutboundQueueReceiver) {
        let inner = Arc::new(Mutex::new(VecDeque::new()));
        let (wake_tx, wake_rx) = mpsc::channel(1);
        (
            Self {
                inner: Arc::clone(&inner),
                wake_tx,
            },
            OutboundQueueReceiver { inner, wake_rx },
        )
    }

    /// Enqueue an envelope. Returns `true` if an older envelope was
    /// dropped to stay within [`OUTBOUND_QUEUE_CAPACITY`].
    pub fn push(&self, envelope: Envelope) -> bool {
        let mut dropped = false;
        {
            let mut queue = self.inner.lock();
            if queue.len() >= OUTBOUND_QUEUE_CAPACITY {
                queue.pop_front();
                dropped = true;
            }
            queue.push_back(envelope);
        }
        let _ = self.wake_tx.try_send(());
        dropped
    }
}

impl OutboundQueueReceiver {
    /// Wait for and drain all currently-queued envelopes, in order.
    pub async fn recv_batch(&mut self) -> Option<Vec<Envelope>> {
        loop {
            {
                let mut queue = self.inner.lock();
                if !queue.is_empty() {
                    return Some(queue.drain(..).collect());
                }
            }
            self.wake_rx.recv().await?;
        }
    }
}

/// A connected peer, created on accept and destroyed on disconnect or
/// idle-expiry. Never revived: a reconnect is a new [`PeerId`].
pub struct Peer {
    pub id: PeerId,
    pub subscription: Subscription,
    pub outbound: OutboundQueue,
    pub drop_count: u64,
}

impl Peer {
    pub fn new(id: PeerId) -> (Self, OutboundQueueReceiver) {
        let (outbound, rx) = OutboundQueue::new();
        (
            Self {
                id,
                subscription: Subscription::AllBroadcast,
                outbound,
                drop_count: 0,
            },
            rx,
        )
    }

    /// Enqueue an envelope for delivery. Drops are accounted, never errored:
    /// a slow peer never blocks a producer.
    pub fn enqueue(&mut self, envelope: Envelope) {
        if self.outbound.push(envelope) {
            self.drop_count += 1;
        }
    }
}

#[cfg(test)]
#[path = "peer_tests.rs"]
mod tests;
