//! The Network Manager: deterministic peer-to-peer Data Vector region
//! exchange over per-channel UDP sockets (`spec.md` §4.2).

mod manager;
mod topology;

pub use manager::NetworkManager;
pub use topology::{
    CLOCK_SYNC_READY, ChannelConfig, NOOP_PORT, NodeRole, PORT_RANGE, TopologyConfig, parse_ipv4,
};
