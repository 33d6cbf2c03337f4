// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Tool Server layer: the fixed catalog of tools an agent's runtime
//! calls into, backed by bus requests and a small reference resolver.

pub mod catalog;
pub mod client;
pub mod error;
pub mod identity;
pub mod references;
pub mod server;

pub use catalog::{Deadlines, ToolCall, ToolCatalog, ToolErrorPayload, ToolReply};
pub use client::BusClient;
pub use error::ToolError;
pub use identity::{resolve_self_identity, SelfIdentity};
pub use references::ReferenceTable;
pub use server::run_stdio;
