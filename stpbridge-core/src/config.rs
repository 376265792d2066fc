//! Static switch configuration
//!
//! One file per switch, named `switch<ID>.cfg`:
//!
//! ```text
//! 14          <- bridge priority
//! r-0 T       <- port 0 is a trunk
//! rr-0-1 10   <- port 1 is an access port on VLAN 10
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{BridgeId, Error, Result, VlanId};

/// Static classification of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Carries one untagged VLAN
    Access(VlanId),
    /// Carries tagged frames for every VLAN
    Trunk,
}

impl PortKind {
    pub fn is_trunk(&self) -> bool {
        matches!(self, PortKind::Trunk)
    }

    /// VLAN an access port is bound to
    pub fn access_vlan(&self) -> Option<VlanId> {
        match self {
            PortKind::Access(vlan) => Some(*vlan),
            PortKind::Trunk => None,
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKind::Access(vlan) => write!(f, "access({})", vlan),
            PortKind::Trunk => write!(f, "trunk"),
        }
    }
}

impl FromStr for PortKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "T" {
            return Ok(PortKind::Trunk);
        }

        let id: u16 = s
            .parse()
            .map_err(|_| Error::invalid_config(format!("invalid port type '{}'", s)))?;
        Ok(PortKind::Access(VlanId::try_from(id)?))
    }
}

/// Configuration of a single port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    /// Interface name, as the link layer knows it
    pub name: String,
    pub kind: PortKind,
}

/// Configuration of a whole switch, immutable after startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchConfig {
    /// Bridge priority, used as the bridge id
    pub priority: BridgeId,
    /// Ports, indexed by position
    pub ports: Vec<PortConfig>,
}

impl SwitchConfig {
    /// Build a configuration directly from port kinds (names are generated)
    pub fn new(priority: u16, kinds: impl IntoIterator<Item = PortKind>) -> Self {
        let ports = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| PortConfig {
                name: format!("port{}", i),
                kind,
            })
            .collect();

        Self {
            priority: BridgeId::new(priority),
            ports,
        }
    }

    /// Parse the text of a configuration file
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let first = lines
            .next()
            .ok_or_else(|| Error::invalid_config("missing bridge priority"))?;
        let priority_field = first.split_whitespace().next().unwrap_or_default();
        let priority: u16 = priority_field.parse().map_err(|_| {
            Error::invalid_config(format!("invalid bridge priority '{}'", priority_field))
        })?;

        let mut ports = Vec::new();
        for (index, line) in lines.enumerate() {
            let mut fields = line.split_whitespace();
            let name = fields
                .next()
                .ok_or_else(|| Error::invalid_config(format!("port {}: empty line", index)))?;
            let kind = fields
                .next()
                .ok_or_else(|| {
                    Error::invalid_config(format!("port {} ({}): missing port type", index, name))
                })?
                .parse()?;

            ports.push(PortConfig {
                name: name.to_string(),
                kind,
            });
        }

        Ok(Self {
            priority: BridgeId::new(priority),
            ports,
        })
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    /// Path of the configuration file for switch `id` inside `dir`
    pub fn path_for(dir: &Path, id: &str) -> PathBuf {
        dir.join(format!("switch{}.cfg", id))
    }

    /// Load `switch<id>.cfg` from `dir`
    pub fn for_switch(dir: &Path, id: &str) -> Result<Self> {
        Self::load(&Self::path_for(dir, id))
    }

    /// Port kinds in index order
    pub fn kinds(&self) -> Vec<PortKind> {
        self.ports.iter().map(|p| p.kind).collect()
    }

    /// Interface names in index order
    pub fn interface_names(&self) -> Vec<String> {
        self.ports.iter().map(|p| p.name.clone()).collect()
    }

    /// Check that the link exposes exactly the configured ports
    pub fn ensure_port_count(&self, link_ports: usize) -> Result<()> {
        if self.ports.len() != link_ports {
            return Err(Error::invalid_config(format!(
                "configuration describes {} ports but the link has {}",
                self.ports.len(),
                link_ports
            )));
        }
        Ok(())
    }
}
