//! Simulated Ethernet switch
//!
//! A [`Switch`] learns source addresses into a [`ForwardingTable`], forwards
//! frames between access and trunk ports with VLAN tagging, and runs a
//! simplified spanning tree so loops between trunks get blocked.
//!
//! Two tasks run per switch: the [`Dispatcher`] receive loop and the
//! [`BpduScheduler`]. They share one [`BridgeState`] behind a mutex.

use parking_lot::Mutex;
use std::sync::Arc;

pub mod bridge;
pub mod dispatch;
pub mod fdb;
pub mod port;
pub mod scheduler;
pub mod stats;
pub mod switch;

pub use bridge::{BridgeSnapshot, BridgeState, Outbound, RootInfo};
pub use dispatch::Dispatcher;
pub use fdb::{FdbKey, ForwardingTable};
pub use port::{DropReason, Egress, PortTable, StpState};
pub use scheduler::{BpduScheduler, SchedulerConfig};
pub use stats::{StatsSnapshot, SwitchStats};
pub use switch::{Switch, SwitchHandle};

/// Bridge state shared between the dispatch loop and the scheduler
pub type SharedState = Arc<Mutex<BridgeState>>;
