// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-delimited translation between a child process's stdio and the bus.

use serde::Serialize;
use symposium_core::{Envelope, IdGen, MessageId, Tag, UuidIdGen};
use tokio::io::{
    split, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader,
    ReadHalf, WriteHalf,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::BridgeError;

/// Why [`run`] returned: which side closed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The child's input stream reached EOF; a normal shutdown.
    InputClosed,
    /// The broker connection closed mid-session.
    BrokerDisconnected,
}

/// Pipe `input` to the broker connection and the broker connection to
/// `output`, until either side closes. Declares the configured subscription
/// (and role, if any) on the broker connection before piping starts.
pub async fn run<R, W, B>(
    config: Config,
    input: R,
    output: W,
    broker: B,
) -> Result<BridgeOutcome, BridgeError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    B: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (broker_read, mut broker_write) = split(broker);
    write_subscribe(&mut broker_write, &config).await?;

    let tag = config.tag.clone();
    let input_task = tokio::spawn(pump_input(input, broker_write, tag));
    let output_task = tokio::spawn(pump_output(broker_read, output));

    tokio::select! {
        result = input_task => {
            output_task.abort();
            result??;
            Ok(BridgeOutcome::InputClosed)
        }
        result = output_task => {
            input_task.abort();
            result??;
            Ok(BridgeOutcome::BrokerDisconnected)
        }
    }
}

async fn write_subscribe<B>(broker_write: &mut WriteHalf<B>, config: &Config) -> Result<(), BridgeError>
where
    B: AsyncRead + AsyncWrite + Unpin,
{
    let envelope = Envelope::new(
        MessageId::new(UuidIdGen.next()),
        Tag::Subscribe,
        subscribe_payload(config),
    );
    write_envelope(broker_write, &envelope).await
}

fn subscribe_payload(config: &Config) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    if let Some(types) = &config.subscribe_types {
        fields.insert("types".into(), to_value(types));
    }
    if let Some(role) = &config.role {
        fields.insert("role".into(), to_value(role));
    }
    serde_json::Value::Object(fields)
}

fn to_value<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

async fn write_envelope<B>(broker_write: &mut WriteHalf<B>, envelope: &Envelope) -> Result<(), BridgeError>
where
    B: AsyncRead + AsyncWrite + Unpin,
{
    let line = envelope.to_line().map_err(BridgeError::Encode)?;
    broker_write.write_all(line.as_bytes()).await?;
    broker_write.write_all(b"\n").await?;
    broker_write.flush().await?;
    Ok(())
}

/// Read lines from the child's input, wrap each as an envelope tagged
/// `tag`, and submit it to the broker connection.
async fn pump_input<R, B>(mut input: R, mut broker_write: WriteHalf<B>, tag: Tag) -> Result<(), BridgeError>
where
    R: AsyncBufRead + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let ids = UuidIdGen;
    let mut line = String::new();
    loop {
        line.clear();
        let read = input.read_line(&mut line).await?;
        if read == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end_matches('\n');
        if trimmed.is_empty() {
            continue;
        }
        let payload: serde_json::Value = match serde_json::from_str(trimmed) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "dropping malformed input line");
                continue;
            }
        };
        let envelope = Envelope::new(MessageId::new(ids.next()), tag.clone(), payload);
        write_envelope(&mut broker_write, &envelope).await?;
    }
}

/// Read envelopes from the broker connection and write each, serialized
/// whole, as one line on the child's output, in the order received.
async fn pump_output<W, B>(broker_read: ReadHalf<B>, mut output: W) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(broker_read);
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            return Ok(());
        }
        let trimmed = line.trim_end_matches('\n');
        if trimmed.is_empty() {
            continue;
        }
        let envelope: Envelope = match Envelope::from_line(trimmed) {
            Ok(envelope) => envelope,
            Err(error) => {
                debug!(%error, "dropping malformed broker line");
                continue;
            }
        };
        let out_line = envelope.to_line().map_err(BridgeError::Encode)?;
        output.write_all(out_line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
