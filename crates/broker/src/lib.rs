// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod acquirer;
pub mod config;
pub mod error;
pub mod peer;
pub mod replay;
pub mod roles;
pub mod server;

pub use acquirer::{acquire, AcquireError, Acquired};
pub use config::Config;
pub use error::{BrokerError, ConnectionError};
pub use peer::{OutboundQueue, OutboundQueueReceiver, Peer, Subscription, OUTBOUND_QUEUE_CAPACITY};
pub use replay::{ReplayBounds, ReplayBuffer};
pub use roles::{Role, RoleRegistry};
pub use server::run;
