// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Bridge Client: lets a child process that speaks line-delimited JSON on
//! its standard streams participate on the bus without linking the broker
//! protocol itself.

pub mod config;
pub mod connect;
pub mod error;
pub mod pipe;
pub mod spawn;

pub use config::{Config, Role};
pub use connect::connect;
pub use error::BridgeError;
pub use pipe::{run, BridgeOutcome};

use tokio::io::{stdin, stdout, BufReader};

/// Run the bridge against the process's own stdin/stdout: consult the
/// Acquirer, connect (spawning a broker if none is reachable), then pipe
/// until either side closes.
pub async fn run_stdio(config: Config) -> Result<BridgeOutcome, BridgeError> {
    let broker = connect(&config).await?;
    run(config, BufReader::new(stdin()), stdout(), broker).await
}
