//! Frame codec for the STP bridge
//!
//! - [`ethernet`] - Ethernet header parsing, VLAN tag insertion and removal
//! - [`bpdu`] - the control frame bridges exchange to build the spanning tree
//!
//! ```rust
//! use stpbridge_core::{MacAddr, VlanId};
//! use stpbridge_packet::{insert_vlan_tag, parse_header, remove_vlan_tag};
//!
//! let mut frame = Vec::new();
//! frame.extend_from_slice(MacAddr::BROADCAST.as_bytes());
//! frame.extend_from_slice(&[0x02, 0, 0, 0, 0, 1]);
//! frame.extend_from_slice(&[0x08, 0x00, 0xde, 0xad]);
//!
//! let vlan = VlanId::new(10).unwrap();
//! let tagged = insert_vlan_tag(&frame, vlan).unwrap();
//! assert_eq!(parse_header(&tagged).unwrap().vlan, Some(vlan));
//! assert_eq!(&remove_vlan_tag(&tagged).unwrap()[..], &frame[..]);
//! ```

pub mod bpdu;
pub mod ethernet;

pub use bpdu::{ControlFrame, CONTROL_FRAME_SIZE};
pub use ethernet::{
    insert_vlan_tag, parse_header, remove_vlan_tag, EthernetHeader, VLAN_TAG_MARKER,
    VLAN_TAG_SIZE,
};
