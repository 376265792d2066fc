//! Common types used throughout the bridge

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Broadcast MAC address (ff:ff:ff:ff:ff:ff)
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    /// Bridge group address that carries control frames (01:80:c2:00:00:00)
    pub const BRIDGE_GROUP: MacAddr = MacAddr([0x01, 0x80, 0xC2, 0x00, 0x00, 0x00]);

    /// Zero MAC address (00:00:00:00:00:00)
    pub const ZERO: MacAddr = MacAddr([0x00; 6]);

    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Create a MAC address from the first six bytes of a slice
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = slice.get(..6)?.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Group bit set in the first octet
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(crate::Error::Malformed(format!("invalid MAC address '{}'", s)));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::Malformed(format!("invalid MAC address '{}'", s)))?;
        }

        Ok(MacAddr(bytes))
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

/// 12-bit VLAN identifier (0-4095)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VlanId(u16);

impl VlanId {
    /// Largest value that fits in the 12-bit field
    pub const MAX: u16 = 0x0FFF;

    /// Create a VLAN id, rejecting values wider than 12 bits
    pub fn new(id: u16) -> Option<Self> {
        (id <= Self::MAX).then_some(Self(id))
    }

    /// Keep the low 12 bits of a tag control field
    pub fn from_tci(tci: u16) -> Self {
        Self(tci & Self::MAX)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = crate::Error;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        VlanId::new(id).ok_or_else(|| {
            crate::Error::invalid_config(format!("VLAN id {} exceeds {}", id, VlanId::MAX))
        })
    }
}

/// Bridge identity: the configured priority, compared numerically
///
/// Lower wins the root election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BridgeId(pub u16);

impl BridgeId {
    pub fn new(priority: u16) -> Self {
        Self(priority)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ethertype constants
pub mod ethertypes {
    /// Marker that flags a VLAN tag on this network (not the standard 0x8100)
    pub const VLAN_TAG: u16 = 0x8200;
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
}

/// Spanning tree constants
pub mod stp_constants {
    /// Cost added for every hop towards the root
    pub const LINK_COST: u16 = 10;

    /// Default period between root hellos, in milliseconds
    pub const DEFAULT_HELLO_MS: u64 = 1000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display_and_parse() {
        let mac = MacAddr([0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
        assert_eq!(mac.to_string(), "00:1a:2b:3c:4d:5e");
        assert_eq!("00:1a:2b:3c:4d:5e".parse::<MacAddr>().unwrap(), mac);
        assert!("00:1a:2b".parse::<MacAddr>().is_err());
        assert!("zz:1a:2b:3c:4d:5e".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_classes() {
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert!(MacAddr::BRIDGE_GROUP.is_multicast());
        assert!(!MacAddr::BRIDGE_GROUP.is_broadcast());
        assert!(!MacAddr([0x02, 0, 0, 0, 0, 1]).is_multicast());
    }

    #[test]
    fn test_mac_from_slice() {
        assert_eq!(
            MacAddr::from_slice(&[1, 2, 3, 4, 5, 6, 7]),
            Some(MacAddr([1, 2, 3, 4, 5, 6]))
        );
        assert_eq!(MacAddr::from_slice(&[1, 2, 3]), None);
    }

    #[test]
    fn test_vlan_range() {
        assert_eq!(VlanId::new(0).map(VlanId::get), Some(0));
        assert_eq!(VlanId::new(4095).map(VlanId::get), Some(4095));
        assert!(VlanId::new(4096).is_none());
        assert_eq!(VlanId::from_tci(0xF00A).get(), 0x00A);
        assert!(VlanId::try_from(5000).is_err());
    }

    #[test]
    fn test_bridge_id_ordering() {
        assert!(BridgeId(10) < BridgeId(20));
        assert_eq!(BridgeId::new(30).get(), 30);
    }
}
