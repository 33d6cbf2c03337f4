// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `symposium daemon`: run the broker loop on this process.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use symposium_broker::{Acquired, Config};
use symposium_core::SystemClock;

pub async fn run(endpoint: PathBuf, quiet_interval_secs: u64) -> anyhow::Result<()> {
    match symposium_broker::acquire(&endpoint)
        .await
        .context("failed to acquire the broker endpoint")?
    {
        Acquired::NoLeader => {
            bail!("a broker is already listening at {}", endpoint.display());
        }
        Acquired::Broker(listener) => {
            let config = Config {
                endpoint_path: endpoint.clone(),
                quiet_interval: Duration::from_secs(quiet_interval_secs),
                ..Config::default()
            };
            tracing::info!(endpoint = %endpoint.display(), "broker listening");
            symposium_broker::run(listener, endpoint, config, Arc::new(SystemClock))
                .await
                .context("broker loop exited with an error")?;
            Ok(())
        }
    }
}
