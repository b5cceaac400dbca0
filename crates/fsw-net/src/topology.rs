use std::collections::HashSet;
use std::net::Ipv4Addr;

use fsw_datavector::{DataVector, ElementId, ElementType};
use fsw_errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// The reserved port carrying the 1-byte "no-op flush" workaround
/// (`spec.md` §4.2, §6).
pub const NOOP_PORT: u16 = 2200;

/// Region-channel ports lie in this range.
pub const PORT_RANGE: std::ops::RangeInclusive<u16> = 2201..=2299;

/// The clock-sync "ready" byte sent once from the Control Node to each
/// Device Node before the tick loop starts (`SPEC_FULL.md` §2).
pub const CLOCK_SYNC_READY: u8 = 0;

/// A node on the flight LAN, drawn from the closed set the topology fixes:
/// one Control Node, N Device Nodes, and an optional Ground Node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Control,
    Device(u8),
    Ground,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Control => write!(f, "Control"),
            NodeRole::Device(n) => write!(f, "Device{n}"),
            NodeRole::Ground => write!(f, "Ground"),
        }
    }
}

/// An undirected channel between two nodes, hosted on one UDP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub node_a: NodeRole,
    pub node_b: NodeRole,
    pub port: u16,
}

impl ChannelConfig {
    pub const fn new(node_a: NodeRole, node_b: NodeRole, port: u16) -> Self {
        Self { node_a, node_b, port }
    }

    fn other(&self, me: NodeRole) -> Option<NodeRole> {
        if self.node_a == me {
            Some(self.node_b)
        } else if self.node_b == me {
            Some(self.node_a)
        } else {
            None
        }
    }

    fn unordered_pair(&self) -> (NodeRole, NodeRole) {
        // Order by a stable key so {a, b} and {b, a} compare equal.
        let key = |n: NodeRole| match n {
            NodeRole::Control => (0u8, 0u8),
            NodeRole::Device(i) => (1, i),
            NodeRole::Ground => (2, 0),
        };
        if key(self.node_a) <= key(self.node_b) {
            (self.node_a, self.node_b)
        } else {
            (self.node_b, self.node_a)
        }
    }
}

/// The full, validated wire topology for one node's `NetworkManager`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub nodes: Vec<(NodeRole, Ipv4Addr)>,
    pub channels: Vec<ChannelConfig>,
    pub me: NodeRole,
    pub tx_count_elem: ElementId,
    pub rx_count_elem: ElementId,
    /// Whether `send` follows the main datagram with the 1-byte no-op
    /// flush send (`spec.md` §9 Design Notes: "make it toggleable").
    pub flush_workaround: bool,
}

impl TopologyConfig {
    fn ip_of(&self, node: NodeRole) -> Option<Ipv4Addr> {
        self.nodes.iter().find(|(n, _)| *n == node).map(|(_, ip)| *ip)
    }

    /// Validate the topology: non-empty node/channel lists, distinct IPs,
    /// channels referencing only defined nodes with no duplicate unordered
    /// pair, ports in range, `me` defined, and the tx/rx counter elements
    /// present in `dv` with type `u32`.
    pub fn validate(&self, dv: &DataVector) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::InvalidConfig);
        }
        if self.channels.is_empty() {
            return Err(Error::InvalidConfig);
        }

        let mut seen_ips = HashSet::new();
        for (_, ip) in &self.nodes {
            if !seen_ips.insert(*ip) {
                return Err(Error::DuplicateIp);
            }
        }

        if self.ip_of(self.me).is_none() {
            return Err(Error::InvalidNode);
        }

        let mut seen_pairs = HashSet::new();
        for channel in &self.channels {
            if self.ip_of(channel.node_a).is_none() || self.ip_of(channel.node_b).is_none() {
                return Err(Error::InvalidNode);
            }
            if !PORT_RANGE.contains(&channel.port) {
                return Err(Error::InvalidPort);
            }
            if !seen_pairs.insert(channel.unordered_pair()) {
                return Err(Error::DuplicateChannel);
            }
        }

        for elem in [self.tx_count_elem, self.rx_count_elem] {
            if dv.type_of(elem)? != ElementType::U32 {
                return Err(Error::IncorrectType);
            }
        }

        Ok(())
    }

    /// The channels that involve `self.me`, paired with the peer on the
    /// other end.
    pub(crate) fn my_channels(&self) -> Vec<(NodeRole, ChannelConfig)> {
        self.channels
            .iter()
            .filter_map(|c| c.other(self.me).map(|peer| (peer, *c)))
            .collect()
    }

    pub(crate) fn ip(&self, node: NodeRole) -> Result<Ipv4Addr> {
        self.ip_of(node).ok_or(Error::InvalidNode)
    }
}

/// Parse a dotted-decimal IPv4 string per the original's manual octet
/// validation, rather than the permissive parsing `Ipv4Addr::from_str`
/// otherwise does. Used by demo/test topology loaders that express an
/// address as a string (config structs built in Rust take `Ipv4Addr`
/// directly and never go through this path).
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return Err(Error::InvalidIpSize);
    }
    let mut octets = [0u8; 4];
    for (i, part) in parts.iter().enumerate() {
        octets[i] = part.parse::<u16>().ok().filter(|v| *v <= 255).ok_or(Error::InvalidIpOctet)? as u8;
    }
    Ok(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_ip() {
        assert_eq!(parse_ipv4("127.0.0.1").unwrap(), Ipv4Addr::new(127, 0, 0, 1));
    }

    #[test]
    fn rejects_malformed_ip() {
        assert_eq!(parse_ipv4("1.2.3").unwrap_err(), Error::InvalidIpSize);
        assert_eq!(parse_ipv4("1.2.3.999").unwrap_err(), Error::InvalidIpOctet);
        assert_eq!(parse_ipv4("1.2.3.abc").unwrap_err(), Error::InvalidIpOctet);
    }
}
