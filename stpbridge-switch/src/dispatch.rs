//! Frame dispatch loop
//!
//! Receives every frame from the link, learns the source address, hands
//! control frames to the state machine and forwards or floods the rest
//! through the egress policy.

use bytes::Bytes;
use std::sync::Arc;
use stpbridge_core::{Error, Link, MacAddr, PortKind, Result, VlanId};
use stpbridge_packet::{parse_header, ControlFrame, EthernetHeader};
use tracing::{debug, trace, warn};

use crate::bridge::Outbound;
use crate::fdb::ForwardingTable;
use crate::port::Egress;
use crate::stats::SwitchStats;
use crate::SharedState;

/// Send every frame in `outbound`, returning how many went out
pub(crate) fn transmit(link: &dyn Link, stats: &SwitchStats, outbound: Vec<Outbound>) -> usize {
    let mut sent = 0;
    for Outbound { port, frame } in outbound {
        match link.send(port, &frame) {
            Ok(()) => sent += 1,
            Err(e) => {
                warn!(port, error = %e, "Failed to send frame");
                stats.increment_frames_dropped();
            }
        }
    }
    sent
}

/// Per-switch receive loop
pub struct Dispatcher {
    link: Arc<dyn Link>,
    state: SharedState,
    fdb: Arc<ForwardingTable>,
    stats: Arc<SwitchStats>,
}

impl Dispatcher {
    pub fn new(
        link: Arc<dyn Link>,
        state: SharedState,
        fdb: Arc<ForwardingTable>,
        stats: Arc<SwitchStats>,
    ) -> Self {
        Self {
            link,
            state,
            fdb,
            stats,
        }
    }

    /// Receive and handle frames until the link closes
    pub async fn run(self) -> Result<()> {
        debug!(ports = self.link.port_count(), "Dispatch loop started");

        loop {
            let (port, frame) = match self.link.recv().await {
                Ok(received) => received,
                Err(Error::LinkClosed) => {
                    debug!("Link closed, dispatch loop exiting");
                    return Err(Error::LinkClosed);
                }
                Err(e) => {
                    warn!(error = %e, "Receive failed");
                    continue;
                }
            };

            if let Err(e) = self.handle_frame(port, &frame) {
                self.stats.increment_decode_errors();
                debug!(port, len = frame.len(), error = %e, "Dropping frame");
            }
        }
    }

    /// Handle one frame received on `port`
    pub fn handle_frame(&self, port: usize, frame: &Bytes) -> Result<()> {
        self.stats.increment_frames_received();

        let header = parse_header(frame)?;
        let ingress = self.state.lock().ports().kind(port)?;
        let vlan = effective_vlan(&header, ingress);

        if let Some(vlan) = vlan {
            if let Some(previous) = self.fdb.learn(vlan, header.source, port) {
                if previous != port {
                    debug!(mac = %header.source, vlan = %vlan, from = previous, to = port, "Station moved");
                }
            }
        }

        trace!(
            port,
            src = %header.source,
            dst = %header.destination,
            vlan = ?vlan.map(VlanId::get),
            "Frame received"
        );

        if header.destination.is_broadcast() {
            return self.flood(port, frame, vlan);
        }

        if header.destination == MacAddr::BRIDGE_GROUP {
            return self.handle_control_frame(port, frame);
        }

        match vlan.and_then(|vlan| self.fdb.lookup(vlan, header.destination)) {
            Some(dest) => self.forward(port, dest, frame, vlan),
            None => self.flood(port, frame, vlan),
        }
    }

    fn handle_control_frame(&self, port: usize, frame: &Bytes) -> Result<()> {
        let bpdu = ControlFrame::decode(frame)?;
        self.stats.increment_bpdus_received();
        trace!(port, %bpdu, "Control frame received");

        let outbound = self.state.lock().handle_control_frame(port, bpdu)?;
        let sent = transmit(self.link.as_ref(), &self.stats, outbound);
        self.stats.add_bpdus_sent(sent as u64);
        Ok(())
    }

    fn flood(&self, ingress: usize, frame: &Bytes, vlan: Option<VlanId>) -> Result<()> {
        self.stats.increment_frames_flooded();
        let outbound = {
            let state = self.state.lock();
            let ports = state.ports();
            let mut outbound = Vec::new();
            for dest in (0..ports.len()).filter(|&dest| dest != ingress) {
                match ports.egress(ingress, dest, frame, vlan)? {
                    Egress::Forward(bytes) => outbound.push(Outbound { port: dest, frame: bytes }),
                    Egress::Drop(reason) => {
                        trace!(port = dest, ?reason, "Flood copy withheld");
                        self.stats.increment_frames_dropped();
                    }
                }
            }
            outbound
        };

        let sent = transmit(self.link.as_ref(), &self.stats, outbound);
        self.stats.add_frames_forwarded(sent as u64);
        Ok(())
    }

    fn forward(&self, ingress: usize, dest: usize, frame: &Bytes, vlan: Option<VlanId>) -> Result<()> {
        let egress = self.state.lock().ports().egress(ingress, dest, frame, vlan)?;
        match egress {
            Egress::Forward(bytes) => {
                if let Err(e) = self.link.send(dest, &bytes) {
                    warn!(port = dest, error = %e, "Failed to send frame");
                    self.stats.increment_frames_dropped();
                } else {
                    self.stats.increment_frames_forwarded();
                }
            }
            Egress::Drop(reason) => {
                debug!(ingress, port = dest, ?reason, "Frame dropped");
                self.stats.increment_frames_dropped();
            }
        }
        Ok(())
    }
}

/// The tag's VLAN if present, else the access VLAN of the ingress port
fn effective_vlan(header: &EthernetHeader, ingress: PortKind) -> Option<VlanId> {
    header.vlan.or_else(|| ingress.access_vlan())
}
