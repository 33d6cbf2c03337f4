// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reference expansion mechanism.

use crate::id::ReferenceToken;
use serde::{Deserialize, Serialize};

/// A `(token, content)` pair registered by a producer peer and redeemable
/// by any peer via the expand operation. Broker-lifetime only: nothing here
/// survives a broker restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub token: ReferenceToken,
    pub content: serde_json::Value,
}

impl Reference {
    pub fn new(token: ReferenceToken, content: serde_json::Value) -> Self {
        Self { token, content }
    }
}

#[cfg(test)]
#[path = "reference_tests.rs"]
mod tests;
