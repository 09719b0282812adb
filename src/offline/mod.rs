// SPDX-License-Identifier: MPL-2.0
//! Deferred execution of actions while the network is unavailable.
//!
//! - [`OfflineQueue`]: bounded FIFO of async actions, replayed in order
//! - [`ConnectivityMonitor`]: online flag that replays the queue on reconnect
//! - [`HealthCheck`]: HTTP probe feeding the monitor

mod connectivity;
mod queue;

pub use connectivity::{ConnectivityMonitor, Dispatch, HealthCheck};
pub use queue::{ActionError, ActionFuture, OfflineQueue, ProcessReport};
