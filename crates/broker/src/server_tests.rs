// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use symposium_core::FakeClock;

fn core_with_clock(clock: Arc<FakeClock>) -> BrokerCore {
    BrokerCore::new(clock, ReplayBuffer::new(Default::default()))
}

async fn drain(receiver: &mut OutboundQueueReceiver) -> Vec<Envelope> {
    tokio::time::timeout(Duration::from_millis(50), receiver.recv_batch())
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[tokio::test]
async fn broadcast_reaches_every_peer_including_sender() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);

    let (peer_a, mut rx_a) = Peer::new(PeerId::new(1));
    let (peer_b, mut rx_b) = Peer::new(PeerId::new(2));
    core.on_connect(PeerId::new(1), peer_a);
    core.on_connect(PeerId::new(2), peer_b);

    let envelope = Envelope::new(MessageId::new("m1"), Tag::LogProgress, json!({"msg": "a"}));
    core.process_envelope(PeerId::new(1), envelope);

    assert_eq!(drain(&mut rx_a).await.len(), 1);
    assert_eq!(drain(&mut rx_b).await.len(), 1);
}

#[tokio::test]
async fn self_suppressed_tag_skips_the_sender() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);

    let (peer_a, mut rx_a) = Peer::new(PeerId::new(1));
    let (peer_b, mut rx_b) = Peer::new(PeerId::new(2));
    core.on_connect(PeerId::new(1), peer_a);
    core.on_connect(PeerId::new(2), peer_b);

    let envelope = Envelope::new(MessageId::new("m1"), Tag::Heartbeat, json!({}));
    core.process_envelope(PeerId::new(1), envelope);

    assert!(drain(&mut rx_a).await.is_empty());
    assert_eq!(drain(&mut rx_b).await.len(), 1);
}

#[tokio::test]
async fn directed_envelope_reaches_only_the_resolved_role() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);

    let (orchestrator, mut rx_orch) = Peer::new(PeerId::new(1));
    let (other, mut rx_other) = Peer::new(PeerId::new(2));
    core.on_connect(PeerId::new(1), orchestrator);
    core.on_connect(PeerId::new(2), other);
    core.roles.register(Role::Orchestrator, PeerId::new(1));

    let envelope = Envelope::new(MessageId::new("m1"), Tag::SpawnTaskspace, json!({}))
        .with_addressee(Addressee::Orchestrator);
    core.process_envelope(PeerId::new(3), envelope);

    assert_eq!(drain(&mut rx_orch).await.len(), 1);
    assert!(drain(&mut rx_other).await.is_empty());
}

#[tokio::test]
async fn directed_with_no_addressee_falls_back_to_broadcast() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);

    let (asker, mut rx_asker) = Peer::new(PeerId::new(1));
    let (producer, mut rx_producer) = Peer::new(PeerId::new(2));
    core.on_connect(PeerId::new(1), asker);
    core.on_connect(PeerId::new(2), producer);

    let envelope = Envelope::new(MessageId::new("m1"), Tag::ExpandReference, json!({}));
    core.process_envelope(PeerId::new(1), envelope);

    assert!(drain(&mut rx_asker).await.is_empty());
    assert_eq!(drain(&mut rx_producer).await.len(), 1);
}

#[tokio::test]
async fn reply_is_delivered_only_to_the_request_originator() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);

    let (requester, mut rx_requester) = Peer::new(PeerId::new(1));
    let (replier, mut rx_replier) = Peer::new(PeerId::new(2));
    core.on_connect(PeerId::new(1), requester);
    core.on_connect(PeerId::new(2), replier);

    let request = Envelope::new(MessageId::new("req-1"), Tag::ExpandReference, json!({}));
    core.process_envelope(PeerId::new(1), request);
    let _ = drain(&mut rx_replier).await; // the broadcast fallback delivery

    let reply = Envelope::new(MessageId::new("reply-1"), Tag::DeleteResponse, json!({}))
        .with_correlation(MessageId::new("req-1"));
    core.process_envelope(PeerId::new(2), reply);

    let delivered = drain(&mut rx_requester).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, MessageId::new("reply-1"));
    assert!(drain(&mut rx_replier).await.is_empty());
}

#[tokio::test]
async fn reply_with_no_known_originator_is_dropped() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);
    let (peer, mut rx) = Peer::new(PeerId::new(1));
    core.on_connect(PeerId::new(1), peer);

    let reply = Envelope::new(MessageId::new("reply-1"), Tag::DeleteResponse, json!({}))
        .with_correlation(MessageId::new("unknown-request"));
    core.process_envelope(PeerId::new(1), reply);

    assert!(drain(&mut rx).await.is_empty());
}

#[tokio::test]
async fn subscribe_narrows_broadcast_and_registers_role() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);
    let (peer, mut rx) = Peer::new(PeerId::new(1));
    core.on_connect(PeerId::new(1), peer);

    let subscribe = Envelope::new(
        MessageId::new("sub-1"),
        Tag::Subscribe,
        json!({"types": ["log-progress"], "role": {"kind": "orchestrator"}}),
    );
    core.process_envelope(PeerId::new(1), subscribe);

    assert_eq!(
        core.roles.resolve(&Addressee::Orchestrator),
        Some(PeerId::new(1))
    );

    let heartbeat = Envelope::new(MessageId::new("hb-1"), Tag::Heartbeat, json!({}));
    core.process_envelope(PeerId::new(2), heartbeat);
    assert!(drain(&mut rx).await.is_empty());

    let progress = Envelope::new(MessageId::new("p-1"), Tag::LogProgress, json!({}));
    core.process_envelope(PeerId::new(2), progress);
    assert_eq!(drain(&mut rx).await.len(), 1);
}

#[tokio::test]
async fn newly_connected_peer_is_replayed_before_live_traffic() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(clock);

    let (early, _rx_early) = Peer::new(PeerId::new(1));
    core.on_connect(PeerId::new(1), early);
    let progress = Envelope::new(MessageId::new("p-1"), Tag::LogProgress, json!({"msg": "a"}));
    core.process_envelope(PeerId::new(1), progress);

    let (late, mut rx_late) = Peer::new(PeerId::new(2));
    core.on_connect(PeerId::new(2), late);

    let replayed = drain(&mut rx_late).await;
    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].id, MessageId::new("p-1"));
}

#[test]
fn idle_timer_fires_only_after_quiet_interval_with_no_peers() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(Arc::clone(&clock));

    assert!(!core.idle_for_at_least(Duration::from_secs(60)));

    clock.advance(59_000);
    assert!(!core.idle_for_at_least(Duration::from_secs(60)));

    clock.advance(2_000);
    assert!(core.idle_for_at_least(Duration::from_secs(60)));
}

#[test]
fn connecting_a_peer_resets_the_idle_clock() {
    let clock = Arc::new(FakeClock::new(0));
    let mut core = core_with_clock(Arc::clone(&clock));

    clock.advance(120_000);
    let (peer, _rx) = Peer::new(PeerId::new(1));
    core.on_connect(PeerId::new(1), peer);
    assert!(!core.idle_for_at_least(Duration::from_secs(60)));

    core.on_disconnect(PeerId::new(1));
    assert!(!core.idle_for_at_least(Duration::from_secs(60)));
    clock.advance(61_000);
    assert!(core.idle_for_at_least(Duration::from_secs(60)));
}
