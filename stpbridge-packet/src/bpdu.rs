//! Control frame (BPDU) encoding and decoding
//!
//! This is the minimal, non-standard encoding the bridges on this network
//! speak to each other:
//!
//! ```text
//! offset  size  field
//!      0     6  destination (01:80:c2:00:00:00)
//!      6     6  source (sender's MAC)
//!     12     2  length (always 23)
//!     14     3  LLC header (42 42 03)
//!     17     2  root bridge id
//!     19     2  sender path cost
//!     21     2  sender bridge id
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use stpbridge_core::{BridgeId, Error, MacAddr, Result};

/// Value carried in the length field
pub const CONTROL_LENGTH_FIELD: u16 = 23;

/// LLC header constant
pub const CONTROL_LLC_HEADER: [u8; 3] = [42, 42, 3];

/// Offset of the first payload field
pub const CONTROL_PAYLOAD_OFFSET: usize = 17;

/// Encoded size of a control frame
pub const CONTROL_FRAME_SIZE: usize = CONTROL_PAYLOAD_OFFSET + 6;

/// Spanning tree advertisement: "I am `sender`, the root is `root`, and it
/// costs me `path_cost` to reach it"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFrame {
    pub root: BridgeId,
    pub sender: BridgeId,
    pub path_cost: u16,
}

impl ControlFrame {
    pub fn new(root: BridgeId, sender: BridgeId, path_cost: u16) -> Self {
        Self {
            root,
            sender,
            path_cost,
        }
    }

    /// Hello sent by a bridge that believes it is the root
    pub fn root_hello(own: BridgeId) -> Self {
        Self::new(own, own, 0)
    }

    /// Encode to wire bytes, using `source` as the frame's source MAC
    pub fn encode(&self, source: MacAddr) -> Bytes {
        let mut buffer = BytesMut::with_capacity(CONTROL_FRAME_SIZE);

        buffer.put_slice(MacAddr::BRIDGE_GROUP.as_bytes());
        buffer.put_slice(source.as_bytes());
        buffer.put_u16(CONTROL_LENGTH_FIELD);
        buffer.put_slice(&CONTROL_LLC_HEADER);

        buffer.put_u16(self.root.get());
        buffer.put_u16(self.path_cost);
        buffer.put_u16(self.sender.get());

        buffer.freeze()
    }

    /// Decode from wire bytes
    ///
    /// Fields are read at fixed offsets; the header bytes are not validated.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Error::check_len(data, CONTROL_FRAME_SIZE)?;

        let field = |offset: usize| u16::from_be_bytes([data[offset], data[offset + 1]]);
        let root = field(CONTROL_PAYLOAD_OFFSET);
        let path_cost = field(CONTROL_PAYLOAD_OFFSET + 2);
        let sender = field(CONTROL_PAYLOAD_OFFSET + 4);

        Ok(Self {
            root: BridgeId::new(root),
            sender: BridgeId::new(sender),
            path_cost,
        })
    }
}

impl fmt::Display for ControlFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root={} sender={} cost={}",
            self.root, self.sender, self.path_cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethernet::parse_header;

    const OWN_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x14]);

    #[test]
    fn test_encode_layout() {
        let bytes = ControlFrame::new(BridgeId(10), BridgeId(20), 0x0102).encode(OWN_MAC);

        assert_eq!(bytes.len(), CONTROL_FRAME_SIZE);
        assert_eq!(&bytes[0..6], MacAddr::BRIDGE_GROUP.as_bytes());
        assert_eq!(&bytes[6..12], OWN_MAC.as_bytes());
        assert_eq!(&bytes[12..14], &[0x00, 23]);
        assert_eq!(&bytes[14..17], &[42, 42, 3]);
        // root, cost, sender
        assert_eq!(&bytes[17..23], &[0x00, 10, 0x01, 0x02, 0x00, 20]);
    }

    #[test]
    fn test_decode_reads_fixed_offsets() {
        let mut bytes = vec![0u8; CONTROL_FRAME_SIZE];
        bytes[17..23].copy_from_slice(&[0x12, 0x34, 0x00, 0x1E, 0xAB, 0xCD]);

        let frame = ControlFrame::decode(&bytes).unwrap();
        assert_eq!(frame.root, BridgeId(0x1234));
        assert_eq!(frame.path_cost, 30);
        assert_eq!(frame.sender, BridgeId(0xABCD));
    }

    #[test]
    fn test_decode_short() {
        let bytes = ControlFrame::root_hello(BridgeId(1)).encode(OWN_MAC);
        assert!(matches!(
            ControlFrame::decode(&bytes[..22]),
            Err(Error::ShortFrame { needed: 23, actual: 22 })
        ));
    }

    #[test]
    fn test_header_classifies_as_control() {
        let bytes = ControlFrame::root_hello(BridgeId(5)).encode(OWN_MAC);
        let header = parse_header(&bytes).unwrap();

        assert_eq!(header.destination, MacAddr::BRIDGE_GROUP);
        assert_eq!(header.source, OWN_MAC);
        assert_eq!(header.vlan, None);
    }

    #[test]
    fn test_root_hello() {
        let hello = ControlFrame::root_hello(BridgeId(7));
        assert_eq!(hello, ControlFrame::new(BridgeId(7), BridgeId(7), 0));
        assert_eq!(hello.to_string(), "root=7 sender=7 cost=0");
    }
}
