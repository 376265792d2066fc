//! Bridge state machine
//!
//! Holds what this bridge believes about the spanning tree (who the root is,
//! how far away it is, and through which port) together with the trunk port
//! states, and updates both from received control frames.
//!
//! The machine never transmits anything itself. Operations return the
//! [`Outbound`] frames to send, so the caller can release the state lock
//! before touching the link.

use bytes::Bytes;
use std::cmp::Ordering;
use stpbridge_core::{stp_constants::LINK_COST, BridgeId, MacAddr, PortKind, Result};
use stpbridge_packet::ControlFrame;
use tracing::{debug, info, warn};

use crate::port::{PortTable, StpState};

/// A frame to transmit on a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub port: usize,
    pub frame: Bytes,
}

/// What this bridge currently believes about the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootInfo {
    pub root_bridge: BridgeId,
    pub root_path_cost: u16,
    /// Port towards the root; `None` while this bridge is the root
    pub root_port: Option<usize>,
    pub is_root: bool,
}

impl RootInfo {
    fn own(own: BridgeId) -> Self {
        Self {
            root_bridge: own,
            root_path_cost: 0,
            root_port: None,
            is_root: true,
        }
    }
}

/// Point-in-time copy of the bridge state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSnapshot {
    pub own: BridgeId,
    pub root: RootInfo,
    /// Per-port states; `None` for access ports
    pub ports: Vec<Option<StpState>>,
}

/// Spanning tree state of one bridge
#[derive(Debug, Clone)]
pub struct BridgeState {
    own: BridgeId,
    mac: MacAddr,
    root: RootInfo,
    ports: PortTable,
}

impl BridgeState {
    /// Start out as root with every trunk Designated
    pub fn new(own: BridgeId, mac: MacAddr, kinds: impl IntoIterator<Item = PortKind>) -> Self {
        let mut state = Self {
            own,
            mac,
            root: RootInfo::own(own),
            ports: PortTable::new(kinds),
        };
        state.designate_all_if_root();

        info!(bridge = %own, mac = %mac, ports = state.ports.len(), "Bridge initialised as root");
        state
    }

    pub fn own_id(&self) -> BridgeId {
        self.own
    }

    pub fn mac(&self) -> MacAddr {
        self.mac
    }

    pub fn root(&self) -> RootInfo {
        self.root
    }

    pub fn is_root(&self) -> bool {
        self.root.is_root
    }

    pub fn ports(&self) -> &PortTable {
        &self.ports
    }

    pub fn snapshot(&self) -> BridgeSnapshot {
        BridgeSnapshot {
            own: self.own,
            root: self.root,
            ports: self.ports.states(),
        }
    }

    /// Root hellos for every trunk, or nothing if this bridge is not root
    pub fn hello_frames(&self) -> Vec<Outbound> {
        if !self.root.is_root {
            return Vec::new();
        }
        self.flood(ControlFrame::root_hello(self.own))
    }

    /// Apply a control frame received on `port`
    pub fn handle_control_frame(&mut self, port: usize, bpdu: ControlFrame) -> Result<Vec<Outbound>> {
        if !self.ports.kind(port)?.is_trunk() {
            debug!(port, %bpdu, "Ignoring control frame on access port");
            return Ok(Vec::new());
        }

        let cost_via_peer = bpdu.path_cost.saturating_add(LINK_COST);
        let mut outbound = Vec::new();

        match bpdu.root.cmp(&self.root.root_bridge) {
            Ordering::Less => {
                let was_root = self.root.is_root;
                self.root = RootInfo {
                    root_bridge: bpdu.root,
                    root_path_cost: cost_via_peer,
                    root_port: Some(port),
                    is_root: false,
                };

                info!(
                    bridge = %self.own,
                    root = %bpdu.root,
                    cost = cost_via_peer,
                    port,
                    "New root bridge"
                );

                if was_root {
                    let trunks: Vec<usize> = self.ports.trunks().collect();
                    for trunk in trunks {
                        if trunk != port {
                            self.transition(trunk, StpState::Blocking)?;
                        }
                    }
                }
                if self.ports.state(port)? == Some(StpState::Blocking) {
                    self.transition(port, StpState::Designated)?;
                }

                outbound = self.flood(self.advertisement());
            }
            Ordering::Equal => {
                if self.root.root_port == Some(port) {
                    if cost_via_peer < self.root.root_path_cost {
                        debug!(
                            bridge = %self.own,
                            old = self.root.root_path_cost,
                            new = cost_via_peer,
                            "Shorter path to root"
                        );
                        self.root.root_path_cost = cost_via_peer;
                        outbound = self.flood(self.advertisement());
                    }
                } else if bpdu.path_cost > self.root.root_path_cost
                    && self.ports.state(port)? != Some(StpState::Designated)
                {
                    self.transition(port, StpState::Designated)?;
                    outbound.push(Outbound {
                        port,
                        frame: self.advertisement().encode(self.mac),
                    });
                }
            }
            Ordering::Greater => {}
        }

        // Checked on every frame, whatever the root comparison decided
        if bpdu.sender == self.own {
            warn!(bridge = %self.own, port, "Own advertisement came back, loop detected");
            self.transition(port, StpState::Blocking)?;
        }

        self.designate_all_if_root();
        Ok(outbound)
    }

    /// What this bridge tells its neighbours
    fn advertisement(&self) -> ControlFrame {
        ControlFrame::new(self.root.root_bridge, self.own, self.root.root_path_cost)
    }

    fn flood(&self, bpdu: ControlFrame) -> Vec<Outbound> {
        let frame = bpdu.encode(self.mac);
        self.ports
            .trunks()
            .map(|port| Outbound {
                port,
                frame: frame.clone(),
            })
            .collect()
    }

    fn designate_all_if_root(&mut self) {
        if self.root.root_bridge != self.own {
            return;
        }
        for (port, previous) in self.ports.set_all_trunks(StpState::Designated) {
            self.log_transition(port, previous, StpState::Designated);
        }
    }

    fn transition(&mut self, port: usize, state: StpState) -> Result<()> {
        if let Some(previous) = self.ports.set_state(port, state)? {
            if previous != state {
                self.log_transition(port, previous, state);
            }
        }
        Ok(())
    }

    fn log_transition(&self, port: usize, from: StpState, to: StpState) {
        info!(bridge = %self.own, port, from = %from, to = %to, "Port state change");
    }
}
