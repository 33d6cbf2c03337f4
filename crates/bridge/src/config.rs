// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use symposium_core::{Tag, TaskspaceId};

/// Role to declare on the initial `subscribe` control envelope, mirroring
/// the shape the broker parses out of that envelope's payload. The bridge
/// and the broker don't share a Rust type for this — only the wire shape —
/// since the bridge never needs the broker's role→peer index internals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Role {
    Orchestrator,
    Editor { taskspace_id: TaskspaceId },
}

/// Bridge configuration: which broker to connect to, what tag to wrap
/// piped-in lines with, and what this bridge wants to receive.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint_path: PathBuf,
    pub tag: Tag,
    pub subscribe_types: Option<Vec<Tag>>,
    pub role: Option<Role>,
    pub connect_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_path: symposium_broker::Config::default().endpoint_path,
            tag: Tag::Custom,
            subscribe_types: None,
            role: None,
            connect_attempts: 10,
            initial_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
        }
    }
}
