// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn serializes_kebab_case() {
    let json = serde_json::to_string(&Tag::SpawnTaskspace).unwrap();
    assert_eq!(json, "\"spawn-taskspace\"");
    let json = serde_json::to_string(&Tag::TaskspaceRollCall).unwrap();
    assert_eq!(json, "\"taskspace-roll-call\"");
}

#[test]
fn unknown_tag_deserializes_to_custom() {
    let tag: Tag = serde_json::from_str("\"some-future-tag\"").unwrap();
    assert_eq!(tag, Tag::Custom);
}

#[test]
fn round_trips_known_tags() {
    for tag in [
        Tag::SpawnTaskspace,
        Tag::UpdateTaskspace,
        Tag::DeleteTaskspace,
        Tag::TaskspaceUpdated,
        Tag::TaskspaceRollCall,
        Tag::RegisterTaskspaceWindow,
        Tag::DeleteResponse,
        Tag::LogProgress,
        Tag::SignalUser,
        Tag::GetSelection,
        Tag::IdeOperation,
        Tag::PresentWalkthrough,
        Tag::StoreReference,
        Tag::ExpandReference,
        Tag::Subscribe,
        Tag::Heartbeat,
        Tag::Log,
    ] {
        let json = serde_json::to_string(&tag).unwrap();
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}

#[test]
fn replayable_set_matches_spec_4_2() {
    assert!(Tag::LogProgress.is_replayable());
    assert!(Tag::RegisterTaskspaceWindow.is_replayable());
    assert!(Tag::TaskspaceRollCall.is_replayable());
    assert!(Tag::TaskspaceUpdated.is_replayable());

    assert!(!Tag::SpawnTaskspace.is_replayable());
    assert!(!Tag::ExpandReference.is_replayable());
    assert!(!Tag::PresentWalkthrough.is_replayable());
    assert!(!Tag::GetSelection.is_replayable());
}

#[test]
fn directed_tags_route_directed() {
    assert!(matches!(
        Tag::SpawnTaskspace.routing_class(),
        RoutingClass::Directed
    ));
    assert!(matches!(
        Tag::PresentWalkthrough.routing_class(),
        RoutingClass::Directed
    ));
}

#[test]
fn reply_tag_routes_reply() {
    assert!(matches!(
        Tag::DeleteResponse.routing_class(),
        RoutingClass::Reply
    ));
}

#[test]
fn broadcast_tags_route_broadcast() {
    assert!(matches!(
        Tag::LogProgress.routing_class(),
        RoutingClass::Broadcast { self_suppressed: false }
    ));
    assert!(matches!(
        Tag::Subscribe.routing_class(),
        RoutingClass::Broadcast { self_suppressed: true }
    ));
}
