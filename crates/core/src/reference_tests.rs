// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn reference_round_trips() {
    let r = Reference::new(ReferenceToken::new("yiasou"), json!({"guidance": "..."}));
    let s = serde_json::to_string(&r).unwrap();
    let back: Reference = serde_json::from_str(&s).unwrap();
    assert_eq!(back, r);
}
