// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `symposium orchestrator`: open a Project and react to bus traffic for it
//! until this process is asked to stop.

use std::path::PathBuf;

use anyhow::Context;
use symposium_adapters::NoOpSourceAdapter;
use symposium_core::SystemClock;
use symposium_orchestrator::{Engine, OrchestratorBus};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

pub async fn run(project_path: PathBuf, endpoint: PathBuf) -> anyhow::Result<()> {
    let config = symposium_bridge::Config {
        endpoint_path: endpoint,
        ..symposium_bridge::Config::default()
    };
    let (bus, mut incoming, _read_task) = OrchestratorBus::connect(config)
        .await
        .context("failed to connect the orchestrator to the broker")?;

    let mut engine = Engine::new(bus, NoOpSourceAdapter::new(), SystemClock);
    engine
        .open(&project_path)
        .with_context(|| format!("failed to open project at {}", project_path.display()))?;
    engine.roll_call().context("failed to broadcast the startup roll call")?;
    info!(project = %project_path.display(), "orchestrator ready");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    loop {
        tokio::select! {
            envelope = incoming.recv() => {
                match envelope {
                    Some(envelope) => engine.handle(envelope).await,
                    None => {
                        info!("broker connection closed, shutting down");
                        return Ok(());
                    }
                }
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                return Ok(());
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                return Ok(());
            }
        }
    }
}
