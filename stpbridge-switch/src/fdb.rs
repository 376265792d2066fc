//! MAC forwarding table
//!
//! Maps `(VLAN, MAC)` to the port the address was last seen on. Entries are
//! never aged out: a mapping to a port that can no longer reach the host
//! stays until the host is seen again somewhere else.

use dashmap::DashMap;
use stpbridge_core::{MacAddr, VlanId};

/// Forwarding table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FdbKey {
    pub vlan: VlanId,
    pub mac: MacAddr,
}

/// Learned `(VLAN, MAC) -> port` mappings
#[derive(Debug, Default)]
pub struct ForwardingTable {
    entries: DashMap<FdbKey, usize>,
}

impl ForwardingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `mac` on `vlan` lives behind `port`
    ///
    /// Returns the port it was previously mapped to, if any.
    pub fn learn(&self, vlan: VlanId, mac: MacAddr, port: usize) -> Option<usize> {
        self.entries.insert(FdbKey { vlan, mac }, port)
    }

    pub fn lookup(&self, vlan: VlanId, mac: MacAddr) -> Option<usize> {
        self.entries.get(&FdbKey { vlan, mac }).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted copy of every entry
    pub fn entries(&self) -> Vec<(FdbKey, usize)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        entries.sort();
        entries
    }
}
