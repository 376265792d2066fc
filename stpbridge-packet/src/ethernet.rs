//! Ethernet header parsing and VLAN tag handling
//!
//! Frames are Ethernet II. A 4-byte VLAN tag may sit between the MAC pair and
//! the ethertype; it is flagged by [`VLAN_TAG_MARKER`] and carries the VLAN id
//! in the low 12 bits of its second half.

use bytes::{BufMut, Bytes, BytesMut};
use stpbridge_core::{ethertypes, Error, MacAddr, Result, VlanId};

/// Marker that introduces a VLAN tag on this network
pub const VLAN_TAG_MARKER: u16 = ethertypes::VLAN_TAG;

/// Destination + source MAC
pub const MAC_PAIR_SIZE: usize = 12;

/// Untagged header size (MAC pair + ethertype)
pub const HEADER_SIZE: usize = 14;

/// Marker (2 bytes) + tag control (2 bytes)
pub const VLAN_TAG_SIZE: usize = 4;

/// Tagged header size
pub const TAGGED_HEADER_SIZE: usize = HEADER_SIZE + VLAN_TAG_SIZE;

/// Decoded Ethernet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: MacAddr,
    pub source: MacAddr,
    /// Ethertype of the payload (after the tag, if any)
    pub ethertype: u16,
    /// VLAN carried in the tag, if the frame is tagged
    pub vlan: Option<VlanId>,
}

impl EthernetHeader {
    /// Parse the header at the start of `frame`
    pub fn parse(frame: &[u8]) -> Result<Self> {
        Error::check_len(frame, HEADER_SIZE)?;

        let destination = MacAddr::from_slice(&frame[0..6])
            .ok_or_else(|| Error::short_frame(HEADER_SIZE, frame.len()))?;
        let source = MacAddr::from_slice(&frame[6..12])
            .ok_or_else(|| Error::short_frame(HEADER_SIZE, frame.len()))?;

        let ethertype = u16::from_be_bytes([frame[12], frame[13]]);
        if ethertype != VLAN_TAG_MARKER {
            return Ok(Self {
                destination,
                source,
                ethertype,
                vlan: None,
            });
        }

        Error::check_len(frame, TAGGED_HEADER_SIZE)?;
        let tci = u16::from_be_bytes([frame[14], frame[15]]);
        let ethertype = u16::from_be_bytes([frame[16], frame[17]]);

        Ok(Self {
            destination,
            source,
            ethertype,
            vlan: Some(VlanId::from_tci(tci)),
        })
    }

    pub fn is_tagged(&self) -> bool {
        self.vlan.is_some()
    }
}

/// Parse the header of `frame`
pub fn parse_header(frame: &[u8]) -> Result<EthernetHeader> {
    EthernetHeader::parse(frame)
}

/// Encode the 4-byte tag for `vlan`
pub fn vlan_tag(vlan: VlanId) -> [u8; VLAN_TAG_SIZE] {
    let marker = VLAN_TAG_MARKER.to_be_bytes();
    let tci = (vlan.get() & VlanId::MAX).to_be_bytes();
    [marker[0], marker[1], tci[0], tci[1]]
}

/// Insert a tag for `vlan` right after the MAC pair
///
/// The result is four bytes longer than `frame`.
pub fn insert_vlan_tag(frame: &[u8], vlan: VlanId) -> Result<Bytes> {
    Error::check_len(frame, MAC_PAIR_SIZE)?;

    let mut buffer = BytesMut::with_capacity(frame.len() + VLAN_TAG_SIZE);
    buffer.put_slice(&frame[..MAC_PAIR_SIZE]);
    buffer.put_slice(&vlan_tag(vlan));
    buffer.put_slice(&frame[MAC_PAIR_SIZE..]);

    Ok(buffer.freeze())
}

/// Remove the tag that follows the MAC pair
///
/// The result is four bytes shorter than `frame`.
pub fn remove_vlan_tag(frame: &[u8]) -> Result<Bytes> {
    Error::check_len(frame, MAC_PAIR_SIZE + VLAN_TAG_SIZE)?;

    let marker = u16::from_be_bytes([frame[12], frame[13]]);
    if marker != VLAN_TAG_MARKER {
        return Err(Error::Malformed(format!(
            "no VLAN tag to remove: found 0x{:04X}, expected 0x{:04X}",
            marker, VLAN_TAG_MARKER
        )));
    }

    let mut buffer = BytesMut::with_capacity(frame.len() - VLAN_TAG_SIZE);
    buffer.put_slice(&frame[..MAC_PAIR_SIZE]);
    buffer.put_slice(&frame[MAC_PAIR_SIZE + VLAN_TAG_SIZE..]);

    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> Vec<u8> {
        vec![
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x08, 0x00, // IPv4
            0x01, 0x02, 0x03, 0x04, // payload
        ]
    }

    #[test]
    fn test_parse_untagged() {
        let header = parse_header(&sample_frame()).unwrap();
        assert_eq!(header.destination, MacAddr([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
        assert_eq!(header.source, MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
        assert_eq!(header.ethertype, ethertypes::IPV4);
        assert_eq!(header.vlan, None);
        assert!(!header.is_tagged());
    }

    #[test]
    fn test_parse_tagged() {
        let mut frame = sample_frame();
        frame.splice(12..12, [0x82, 0x00, 0xA0, 0x64]);

        let header = parse_header(&frame).unwrap();
        assert_eq!(header.vlan, VlanId::new(100));
        assert_eq!(header.ethertype, ethertypes::IPV4);
    }

    #[test]
    fn test_standard_tpid_is_not_a_tag() {
        let mut frame = sample_frame();
        frame[12] = 0x81;
        frame[13] = 0x00;

        let header = parse_header(&frame).unwrap();
        assert_eq!(header.vlan, None);
        assert_eq!(header.ethertype, 0x8100);
    }

    #[test]
    fn test_short_frames() {
        assert!(matches!(
            parse_header(&[0u8; 13]),
            Err(Error::ShortFrame { needed: 14, actual: 13 })
        ));

        let mut truncated = sample_frame()[..14].to_vec();
        truncated[12] = 0x82;
        truncated[13] = 0x00;
        assert!(matches!(
            parse_header(&truncated),
            Err(Error::ShortFrame { needed: 18, actual: 14 })
        ));

        assert!(matches!(
            insert_vlan_tag(&[0u8; 11], VlanId::new(1).unwrap()),
            Err(Error::ShortFrame { .. })
        ));
        assert!(matches!(
            remove_vlan_tag(&[0u8; 15]),
            Err(Error::ShortFrame { .. })
        ));
    }

    #[test]
    fn test_insert_layout() {
        let frame = sample_frame();
        let tagged = insert_vlan_tag(&frame, VlanId::new(10).unwrap()).unwrap();

        assert_eq!(tagged.len(), frame.len() + VLAN_TAG_SIZE);
        assert_eq!(&tagged[..12], &frame[..12]);
        assert_eq!(&tagged[12..16], &[0x82, 0x00, 0x00, 0x0A]);
        assert_eq!(&tagged[16..], &frame[12..]);
    }

    #[test]
    fn test_remove_untagged_is_malformed() {
        assert!(matches!(
            remove_vlan_tag(&sample_frame()),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_tag_roundtrip_all_vlans() {
        let frame = sample_frame();
        for id in 0..=VlanId::MAX {
            let vlan = VlanId::new(id).unwrap();
            let tagged = insert_vlan_tag(&frame, vlan).unwrap();

            assert_eq!(parse_header(&tagged).unwrap().vlan, Some(vlan));
            assert_eq!(&remove_vlan_tag(&tagged).unwrap()[..], &frame[..]);
        }
    }

    #[test]
    fn test_roundtrip_header_only_frame() {
        let frame = &sample_frame()[..12];
        let tagged = insert_vlan_tag(frame, VlanId::new(7).unwrap()).unwrap();
        assert_eq!(tagged.len(), 16);
        assert_eq!(&remove_vlan_tag(&tagged).unwrap()[..], frame);
    }
}
