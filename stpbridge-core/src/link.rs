//! Link layer abstraction
//!
//! The switch never touches sockets directly. A [`Link`] hands it one
//! `(port, frame)` pair at a time and accepts frames to transmit on a
//! numbered port.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{MacAddr, Result};

/// A set of numbered ports the switch can receive from and send on
#[async_trait]
pub trait Link: Send + Sync {
    /// Wait for the next frame on any port
    ///
    /// Blocks until a frame arrives. Returns [`crate::Error::LinkClosed`]
    /// once no further frame can ever arrive.
    async fn recv(&self) -> Result<(usize, Bytes)>;

    /// Transmit a frame on `port`, fire-and-forget
    fn send(&self, port: usize, frame: &[u8]) -> Result<()>;

    /// MAC address used as the source of frames this switch originates
    fn mac_address(&self) -> MacAddr;

    /// Number of ports, indexed `0..port_count()`
    fn port_count(&self) -> usize;
}
