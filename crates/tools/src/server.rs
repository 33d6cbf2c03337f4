// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs the Tool Server layer on the process's own stdin/stdout for the
//! agent runtime: one JSON `ToolCall` per input line, one JSON `ToolReply`
//! per output line.

use std::sync::Arc;

use symposium_core::Envelope;
use tokio::io::{stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::catalog::{Deadlines, ToolCall, ToolCatalog};
use crate::client::BusClient;
use crate::error::ToolError;
use crate::identity::resolve_self_identity;
use crate::references::ReferenceTable;

/// Resolve self-identity from the current directory, connect to the bus,
/// and serve tool calls from stdin until it closes.
pub async fn run_stdio(endpoint_path: std::path::PathBuf, deadlines: Deadlines) -> Result<(), ToolError> {
    let cwd = std::env::current_dir()?;
    let identity = resolve_self_identity(&cwd)?;
    let references = Arc::new(ReferenceTable::from_env());

    let observer = Arc::clone(&references);
    let on_broadcast = move |envelope: Envelope| observer.observe_envelope(&envelope);

    let config = symposium_bridge::Config {
        endpoint_path,
        ..symposium_bridge::Config::default()
    };
    let (client, _read_task) = BusClient::connect(config, on_broadcast).await?;

    let catalog = ToolCatalog::new(client, identity, references, deadlines);

    serve(catalog, BufReader::new(stdin()), stdout()).await
}

async fn serve<R, W>(catalog: ToolCatalog, mut input: R, mut output: W) -> Result<(), ToolError>
where
    R: AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let read = input.read_line(&mut line).await?;
        if read == 0 {
            debug!("tool call input closed");
            return Ok(());
        }
        let trimmed = line.trim_end_matches('\n');
        if trimmed.is_empty() {
            continue;
        }
        let call: ToolCall = match serde_json::from_str(trimmed) {
            Ok(call) => call,
            Err(error) => {
                warn!(%error, "dropping malformed tool call");
                continue;
            }
        };
        let reply = catalog.dispatch(call).await;
        let line_out = serde_json::to_string(&reply)?;
        output.write_all(line_out.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
