//! Port model and egress policy
//!
//! Every port has a static [`PortKind`]. Trunk ports additionally carry a
//! spanning tree state that the bridge state machine moves between
//! [`StpState::Designated`] and [`StpState::Blocking`].

use bytes::Bytes;
use std::fmt;
use stpbridge_core::{Error, PortKind, Result, VlanId};
use stpbridge_packet::{insert_vlan_tag, remove_vlan_tag};

/// Forwarding eligibility of a trunk port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StpState {
    /// Forwards traffic (the root port is also Designated)
    Designated,
    /// Drops everything except control frames
    Blocking,
}

impl fmt::Display for StpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StpState::Designated => write!(f, "designated"),
            StpState::Blocking => write!(f, "blocking"),
        }
    }
}

/// Why a frame was not sent on a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Destination trunk is blocking
    Blocking,
    /// Frame's VLAN does not match the destination access port
    VlanMismatch,
}

/// Outcome of the egress policy for one destination port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Egress {
    /// Send these bytes
    Forward(Bytes),
    Drop(DropReason),
}

impl Egress {
    pub fn is_forward(&self) -> bool {
        matches!(self, Egress::Forward(_))
    }
}

#[derive(Debug, Clone)]
struct Port {
    kind: PortKind,
    /// `Some` only for trunks
    state: Option<StpState>,
}

/// Static port kinds plus the mutable trunk states
#[derive(Debug, Clone)]
pub struct PortTable {
    ports: Vec<Port>,
}

impl PortTable {
    /// Build the table; every trunk starts out Blocking
    pub fn new(kinds: impl IntoIterator<Item = PortKind>) -> Self {
        let ports = kinds
            .into_iter()
            .map(|kind| Port {
                kind,
                state: kind.is_trunk().then_some(StpState::Blocking),
            })
            .collect();
        Self { ports }
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    fn port(&self, index: usize) -> Result<&Port> {
        self.ports.get(index).ok_or(Error::UnknownPort(index))
    }

    pub fn kind(&self, index: usize) -> Result<PortKind> {
        Ok(self.port(index)?.kind)
    }

    /// Spanning tree state; `None` for access ports
    pub fn state(&self, index: usize) -> Result<Option<StpState>> {
        Ok(self.port(index)?.state)
    }

    /// Set the state of a trunk port
    ///
    /// Returns the previous state. Access ports have no state and are left
    /// untouched (`Ok(None)`).
    pub fn set_state(&mut self, index: usize, state: StpState) -> Result<Option<StpState>> {
        let port = self
            .ports
            .get_mut(index)
            .ok_or(Error::UnknownPort(index))?;
        Ok(port.state.as_mut().map(|s| std::mem::replace(s, state)))
    }

    /// Set every trunk to `state`
    ///
    /// Returns `(index, previous)` for each trunk whose state changed.
    pub fn set_all_trunks(&mut self, state: StpState) -> Vec<(usize, StpState)> {
        self.ports
            .iter_mut()
            .enumerate()
            .filter_map(|(index, port)| match port.state.as_mut() {
                Some(current) if *current != state => {
                    Some((index, std::mem::replace(current, state)))
                }
                _ => None,
            })
            .collect()
    }

    /// Indices of every trunk port
    pub fn trunks(&self) -> impl Iterator<Item = usize> + '_ {
        self.ports
            .iter()
            .enumerate()
            .filter(|(_, port)| port.kind.is_trunk())
            .map(|(index, _)| index)
    }

    /// States of all ports, in index order
    pub fn states(&self) -> Vec<Option<StpState>> {
        self.ports.iter().map(|p| p.state).collect()
    }

    /// Decide what, if anything, goes out on `dest` for a frame that came in
    /// on `ingress` and belongs to `vlan`
    pub fn egress(
        &self,
        ingress: usize,
        dest: usize,
        frame: &Bytes,
        vlan: Option<VlanId>,
    ) -> Result<Egress> {
        let from = self.port(ingress)?;
        let to = self.port(dest)?;

        if to.state == Some(StpState::Blocking) {
            return Ok(Egress::Drop(DropReason::Blocking));
        }

        let egress = match (from.kind, to.kind) {
            (PortKind::Trunk, PortKind::Trunk) => Egress::Forward(frame.clone()),
            (PortKind::Access(a), PortKind::Access(b)) if a == b => Egress::Forward(frame.clone()),
            (PortKind::Access(_), PortKind::Access(_)) => Egress::Drop(DropReason::VlanMismatch),
            (PortKind::Trunk, PortKind::Access(b)) if vlan == Some(b) => {
                Egress::Forward(remove_vlan_tag(frame)?)
            }
            (PortKind::Trunk, PortKind::Access(_)) => Egress::Drop(DropReason::VlanMismatch),
            (PortKind::Access(a), PortKind::Trunk) => Egress::Forward(insert_vlan_tag(frame, a)?),
        };

        Ok(egress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stpbridge_packet::parse_header;

    fn vlan(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    fn untagged() -> Bytes {
        Bytes::from_static(&[
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // dst
            0x02, 0x00, 0x00, 0x00, 0x00, 0x01, // src
            0x08, 0x00, 0xCA, 0xFE,
        ])
    }

    /// 0: trunk, 1: trunk, 2: access 10, 3: access 20, 4: access 10
    fn table() -> PortTable {
        let mut table = PortTable::new([
            PortKind::Trunk,
            PortKind::Trunk,
            PortKind::Access(vlan(10)),
            PortKind::Access(vlan(20)),
            PortKind::Access(vlan(10)),
        ]);
        table.set_state(0, StpState::Designated).unwrap();
        table.set_state(1, StpState::Designated).unwrap();
        table
    }

    #[test]
    fn test_initial_states() {
        let table = PortTable::new([PortKind::Trunk, PortKind::Access(vlan(1))]);
        assert_eq!(table.states(), vec![Some(StpState::Blocking), None]);
        assert_eq!(table.trunks().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_set_state() {
        let mut table = table();
        assert_eq!(
            table.set_state(0, StpState::Blocking).unwrap(),
            Some(StpState::Designated)
        );
        assert_eq!(table.state(0).unwrap(), Some(StpState::Blocking));
        assert_eq!(table.set_state(2, StpState::Blocking).unwrap(), None);
        assert_eq!(table.state(2).unwrap(), None);
        assert!(matches!(
            table.set_state(9, StpState::Blocking),
            Err(Error::UnknownPort(9))
        ));
    }

    #[test]
    fn test_set_all_trunks_reports_changes() {
        let mut table = table();
        table.set_state(1, StpState::Blocking).unwrap();

        assert_eq!(
            table.set_all_trunks(StpState::Designated),
            vec![(1, StpState::Blocking)]
        );
        assert_eq!(
            table.states(),
            vec![
                Some(StpState::Designated),
                Some(StpState::Designated),
                None,
                None,
                None
            ]
        );
        assert!(table.set_all_trunks(StpState::Designated).is_empty());
    }

    #[test]
    fn test_unknown_port() {
        let table = table();
        assert!(matches!(
            table.egress(0, 7, &untagged(), None),
            Err(Error::UnknownPort(7))
        ));
        assert!(matches!(
            table.egress(7, 0, &untagged(), None),
            Err(Error::UnknownPort(7))
        ));
    }

    #[test]
    fn test_blocking_drops_everything() {
        let mut table = table();
        table.set_state(1, StpState::Blocking).unwrap();
        let tagged = insert_vlan_tag(&untagged(), vlan(10)).unwrap();

        for ingress in [0, 2, 3, 4] {
            for (frame, v) in [(untagged(), None), (tagged.clone(), Some(vlan(10)))] {
                assert_eq!(
                    table.egress(ingress, 1, &frame, v).unwrap(),
                    Egress::Drop(DropReason::Blocking)
                );
            }
        }
    }

    #[test]
    fn test_trunk_to_trunk_unchanged() {
        let table = table();
        let tagged = insert_vlan_tag(&untagged(), vlan(20)).unwrap();
        assert_eq!(
            table.egress(0, 1, &tagged, Some(vlan(20))).unwrap(),
            Egress::Forward(tagged)
        );
    }

    #[test]
    fn test_access_to_access() {
        let table = table();
        assert_eq!(
            table.egress(2, 4, &untagged(), Some(vlan(10))).unwrap(),
            Egress::Forward(untagged())
        );
        assert_eq!(
            table.egress(2, 3, &untagged(), Some(vlan(10))).unwrap(),
            Egress::Drop(DropReason::VlanMismatch)
        );
    }

    #[test]
    fn test_trunk_to_access_strips_tag() {
        let table = table();
        let tagged = insert_vlan_tag(&untagged(), vlan(10)).unwrap();

        assert_eq!(
            table.egress(0, 2, &tagged, Some(vlan(10))).unwrap(),
            Egress::Forward(untagged())
        );
        assert_eq!(
            table.egress(0, 3, &tagged, Some(vlan(10))).unwrap(),
            Egress::Drop(DropReason::VlanMismatch)
        );
        // Untagged traffic on a trunk belongs to no VLAN
        assert_eq!(
            table.egress(0, 2, &untagged(), None).unwrap(),
            Egress::Drop(DropReason::VlanMismatch)
        );
    }

    #[test]
    fn test_access_to_trunk_inserts_ingress_vlan() {
        let table = table();

        let out = match table.egress(3, 0, &untagged(), Some(vlan(20))).unwrap() {
            Egress::Forward(bytes) => bytes,
            other => panic!("expected forward, got {:?}", other),
        };
        assert_eq!(out.len(), untagged().len() + 4);
        assert_eq!(parse_header(&out).unwrap().vlan, Some(vlan(20)));
    }
}
