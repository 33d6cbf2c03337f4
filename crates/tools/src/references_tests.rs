// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn peer() -> PeerId {
    PeerId::new(1)
}

#[test]
fn resolves_predefined_tokens_without_registration() {
    let table = ReferenceTable::for_role("implementer");
    let token = ReferenceToken::new("guidance:getting-started");
    assert!(table.resolve(&token).is_some());
    assert!(table.is_predefined(&token));
}

#[test]
fn reviewer_role_loads_a_different_bundle() {
    let table = ReferenceTable::for_role("reviewer");
    assert!(table
        .resolve(&ReferenceToken::new("guidance:review-checklist"))
        .is_some());
}

#[test]
fn registering_a_new_token_then_resolving_it_round_trips() {
    let table = ReferenceTable::for_role("implementer");
    let token = ReferenceToken::new("snippet:abc");
    let content = serde_json::json!({"code": "fn main() {}"});
    table
        .observe_registration(token.clone(), content.clone(), peer())
        .unwrap();
    assert_eq!(table.resolve(&token), Some(content));
    assert_eq!(table.producer_of(&token), Some(peer()));
}

#[test]
fn re_registering_identical_content_is_a_no_op() {
    let table = ReferenceTable::for_role("implementer");
    let token = ReferenceToken::new("snippet:abc");
    let content = serde_json::json!({"code": "fn main() {}"});
    table
        .observe_registration(token.clone(), content.clone(), peer())
        .unwrap();
    table.observe_registration(token, content, peer()).unwrap();
}

#[test]
fn re_registering_conflicting_content_errors() {
    let table = ReferenceTable::for_role("implementer");
    let token = ReferenceToken::new("snippet:abc");
    table
        .observe_registration(token.clone(), serde_json::json!({"code": "a"}), peer())
        .unwrap();
    let result = table.observe_registration(token, serde_json::json!({"code": "b"}), peer());
    assert!(matches!(result, Err(ToolError::ReferenceConflict(_))));
}

#[test]
fn observes_store_reference_broadcasts() {
    let table = ReferenceTable::for_role("implementer");
    let envelope = Envelope::new(
        symposium_core::MessageId::new("e1"),
        Tag::StoreReference,
        serde_json::json!({"token": "snippet:xyz", "content": {"code": "let x = 1;"}}),
    );
    let mut envelope = envelope;
    envelope.origin = Some(symposium_core::Origin { peer_id: peer() });

    table.observe_envelope(&envelope);

    let token = ReferenceToken::new("snippet:xyz");
    assert_eq!(table.resolve(&token), Some(serde_json::json!({"code": "let x = 1;"})));
    assert_eq!(table.producer_of(&token), Some(peer()));
}

#[test]
fn unknown_token_resolves_to_none() {
    let table = ReferenceTable::for_role("implementer");
    assert_eq!(table.resolve(&ReferenceToken::new("nope")), None);
    assert_eq!(table.producer_of(&ReferenceToken::new("nope")), None);
}
