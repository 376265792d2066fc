//! Raw Ethernet link over pnet datalink channels
//!
//! One interface per port. Each interface gets its own blocking reader
//! thread that pushes `(port, frame)` into a shared tokio channel.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use pnet_datalink::{self, Channel, DataLinkReceiver, DataLinkSender, NetworkInterface};
use std::thread;
use stpbridge_core::{Error, Link, MacAddr, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

type Inbound = (usize, Bytes);

/// Link backed by real network interfaces
pub struct RawLink {
    mac: MacAddr,
    names: Vec<String>,
    senders: Vec<Mutex<Box<dyn DataLinkSender>>>,
    receiver: tokio::sync::Mutex<UnboundedReceiver<Inbound>>,
}

impl RawLink {
    /// Open every named interface, in port order
    ///
    /// The switch MAC is taken from the first interface.
    pub fn open<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::invalid_config("at least one interface is required"));
        }

        let available = pnet_datalink::interfaces();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut senders = Vec::with_capacity(names.len());
        let mut mac = None;

        for (port, name) in names.iter().map(AsRef::as_ref).enumerate() {
            let interface = available
                .iter()
                .find(|iface| iface.name == name)
                .ok_or_else(|| Error::link(format!("Interface {} not found", name)))?;

            if mac.is_none() {
                mac = Some(interface_mac(interface)?);
            }

            let (sender, receiver) = match pnet_datalink::channel(interface, Default::default()) {
                Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
                Ok(_) => return Err(Error::link("Unsupported channel type")),
                Err(e) => {
                    return Err(Error::link(format!(
                        "Failed to open channel on {}: {}",
                        name, e
                    )))
                }
            };

            spawn_reader(port, name.to_string(), receiver, tx.clone())?;
            senders.push(Mutex::new(sender));
            info!(port, interface = name, "Opened interface");
        }

        Ok(Self {
            mac: mac.unwrap_or(MacAddr::ZERO),
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            senders,
            receiver: tokio::sync::Mutex::new(rx),
        })
    }

    /// Interface name of each port
    pub fn interface_names(&self) -> &[String] {
        &self.names
    }
}

fn interface_mac(interface: &NetworkInterface) -> Result<MacAddr> {
    interface
        .mac
        .map(|m| MacAddr::new([m.0, m.1, m.2, m.3, m.4, m.5]))
        .ok_or_else(|| Error::link(format!("Interface {} has no MAC address", interface.name)))
}

fn spawn_reader(
    port: usize,
    name: String,
    mut receiver: Box<dyn DataLinkReceiver>,
    tx: UnboundedSender<Inbound>,
) -> Result<()> {
    thread::Builder::new()
        .name(format!("rx-{}", name))
        .spawn(move || loop {
            match receiver.next() {
                Ok(frame) => {
                    if tx.send((port, Bytes::copy_from_slice(frame))).is_err() {
                        debug!(port, "Receiver dropped, reader exiting");
                        break;
                    }
                }
                Err(e) => {
                    error!(port, interface = %name, error = %e, "Receive error, reader exiting");
                    break;
                }
            }
        })?;
    Ok(())
}

#[async_trait]
impl Link for RawLink {
    async fn recv(&self) -> Result<(usize, Bytes)> {
        self.receiver.lock().await.recv().await.ok_or(Error::LinkClosed)
    }

    fn send(&self, port: usize, frame: &[u8]) -> Result<()> {
        let sender = self.senders.get(port).ok_or(Error::UnknownPort(port))?;
        sender
            .lock()
            .send_to(frame, None)
            .ok_or_else(|| Error::link("Failed to send packet"))?
            .map_err(Error::from)
    }

    fn mac_address(&self) -> MacAddr {
        self.mac
    }

    fn port_count(&self) -> usize {
        self.senders.len()
    }
}
