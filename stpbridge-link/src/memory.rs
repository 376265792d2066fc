//! In-process link
//!
//! Ports of different [`MemoryLink`]s can be wired together, so a frame sent
//! on one end shows up in the other link's receive queue. Frames sent on an
//! unwired port go nowhere. Every sent frame is also kept in a per-port
//! capture log that tests drain with [`MemoryLink::take_sent`].

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use stpbridge_core::{Error, Link, MacAddr, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

type Inbound = (usize, Bytes);

#[derive(Debug, Clone)]
struct Peer {
    link: Weak<MemoryLink>,
    port: usize,
}

/// Simulated set of ports backed by tokio channels
#[derive(Debug)]
pub struct MemoryLink {
    mac: MacAddr,
    port_count: usize,
    inbox: Mutex<Option<UnboundedSender<Inbound>>>,
    receiver: tokio::sync::Mutex<UnboundedReceiver<Inbound>>,
    peers: Mutex<Vec<Option<Peer>>>,
    sent: Mutex<Vec<Vec<Bytes>>>,
}

impl MemoryLink {
    pub fn new(mac: MacAddr, port_count: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            mac,
            port_count,
            inbox: Mutex::new(Some(tx)),
            receiver: tokio::sync::Mutex::new(rx),
            peers: Mutex::new(vec![None; port_count]),
            sent: Mutex::new(vec![Vec::new(); port_count]),
        }
    }

    /// Connect `a_port` of `a` with `b_port` of `b`, both directions
    pub fn wire(a: &Arc<Self>, a_port: usize, b: &Arc<Self>, b_port: usize) -> Result<()> {
        a.check_port(a_port)?;
        b.check_port(b_port)?;

        a.peers.lock()[a_port] = Some(Peer {
            link: Arc::downgrade(b),
            port: b_port,
        });
        b.peers.lock()[b_port] = Some(Peer {
            link: Arc::downgrade(a),
            port: a_port,
        });
        Ok(())
    }

    /// Two single-port links wired to each other
    pub fn pair(a_mac: MacAddr, b_mac: MacAddr) -> (Arc<Self>, Arc<Self>) {
        let a = Arc::new(Self::new(a_mac, 1));
        let b = Arc::new(Self::new(b_mac, 1));
        // Port 0 exists on both
        let _ = Self::wire(&a, 0, &b, 0);
        (a, b)
    }

    /// Queue a frame as if it had arrived on `port`
    ///
    /// Ignored once the link is closed.
    pub fn inject(&self, port: usize, frame: Bytes) {
        if let Some(inbox) = self.inbox.lock().as_ref() {
            let _ = inbox.send((port, frame));
        } else {
            trace!(port, "Link closed, frame discarded");
        }
    }

    /// Drain the capture log of `port`
    pub fn take_sent(&self, port: usize) -> Vec<Bytes> {
        self.sent
            .lock()
            .get_mut(port)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Stop accepting frames; `recv` fails with [`Error::LinkClosed`] once
    /// the queue is drained
    pub fn close(&self) {
        self.inbox.lock().take();
    }

    fn check_port(&self, port: usize) -> Result<()> {
        if port < self.port_count {
            Ok(())
        } else {
            Err(Error::UnknownPort(port))
        }
    }
}

#[async_trait]
impl Link for MemoryLink {
    async fn recv(&self) -> Result<(usize, Bytes)> {
        self.receiver.lock().await.recv().await.ok_or(Error::LinkClosed)
    }

    fn send(&self, port: usize, frame: &[u8]) -> Result<()> {
        self.check_port(port)?;
        let frame = Bytes::copy_from_slice(frame);

        let peer = self.peers.lock()[port].clone();
        if let Some(Peer { link, port: peer_port }) = peer {
            if let Some(link) = link.upgrade() {
                link.inject(peer_port, frame.clone());
            }
        }

        self.sent.lock()[port].push(frame);
        Ok(())
    }

    fn mac_address(&self) -> MacAddr {
        self.mac
    }

    fn port_count(&self) -> usize {
        self.port_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC_A: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
    const MAC_B: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x02]);

    #[tokio::test]
    async fn test_wired_ports_deliver() {
        let a = Arc::new(MemoryLink::new(MAC_A, 2));
        let b = Arc::new(MemoryLink::new(MAC_B, 3));
        MemoryLink::wire(&a, 1, &b, 2).unwrap();

        a.send(1, b"hello").unwrap();
        assert_eq!(b.recv().await.unwrap(), (2, Bytes::from_static(b"hello")));

        b.send(2, b"back").unwrap();
        assert_eq!(a.recv().await.unwrap(), (1, Bytes::from_static(b"back")));
    }

    #[tokio::test]
    async fn test_unwired_port_only_captures() {
        let (a, b) = MemoryLink::pair(MAC_A, MAC_B);
        let lone = MemoryLink::new(MAC_A, 1);

        lone.send(0, b"nowhere").unwrap();
        assert_eq!(lone.take_sent(0), vec![Bytes::from_static(b"nowhere")]);
        assert!(lone.take_sent(0).is_empty());

        a.send(0, b"x").unwrap();
        assert_eq!(a.take_sent(0).len(), 1);
        assert_eq!(b.recv().await.unwrap().0, 0);
    }

    #[test]
    fn test_port_bounds() {
        let a = Arc::new(MemoryLink::new(MAC_A, 1));
        let b = Arc::new(MemoryLink::new(MAC_B, 1));

        assert!(matches!(a.send(1, b"x"), Err(Error::UnknownPort(1))));
        assert!(matches!(
            MemoryLink::wire(&a, 0, &b, 4),
            Err(Error::UnknownPort(4))
        ));
        assert!(a.take_sent(7).is_empty());
        assert_eq!(a.mac_address(), MAC_A);
        assert_eq!(a.port_count(), 1);
    }

    #[tokio::test]
    async fn test_close_drains_then_fails() {
        let link = MemoryLink::new(MAC_A, 1);
        link.inject(0, Bytes::from_static(b"queued"));
        link.close();
        link.inject(0, Bytes::from_static(b"late"));

        assert_eq!(link.recv().await.unwrap().1, Bytes::from_static(b"queued"));
        assert!(matches!(link.recv().await, Err(Error::LinkClosed)));
    }
}
