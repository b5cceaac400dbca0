use std::collections::HashMap;
use std::net::{SocketAddrV4, UdpSocket};
use std::os::fd::AsFd;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fsw_datavector::DataVector;
use fsw_errors::{Error, Result};
use nix::sys::select::{FdSet, select};
use nix::sys::time::{TimeVal, TimeValLike};

use crate::topology::{NOOP_PORT, NodeRole, TopologyConfig};

/// The 100-second ceiling on a single `recv_mult` call, per `spec.md` §8 P9.
const MAX_RECV_MULT_NS: u64 = 100_000_000_000;

struct Channel {
    socket: UdpSocket,
    peer_addr: SocketAddrV4,
}

/// Per-channel UDP sockets carrying raw region bytes between this node and
/// its peers, with the tx/rx counters and the no-op flush workaround
/// described in `spec.md` §4.2.
pub struct NetworkManager {
    dv: Arc<DataVector>,
    config: TopologyConfig,
    channels: HashMap<NodeRole, Channel>,
}

impl NetworkManager {
    /// Validate `config` against `dv` and bind one UDP socket per channel
    /// involving `config.me`.
    pub fn create(config: TopologyConfig, dv: Arc<DataVector>) -> Result<Self> {
        config.validate(&dv)?;

        let my_ip = config.ip(config.me)?;
        let mut channels = HashMap::new();
        for (peer, channel) in config.my_channels() {
            let peer_ip = config.ip(peer)?;
            let local_addr = SocketAddrV4::new(my_ip, channel.port);
            let peer_addr = SocketAddrV4::new(peer_ip, channel.port);
            let socket = UdpSocket::bind(local_addr).map_err(|err| {
                tracing::error!(%err, node = %peer, port = channel.port, "failed to bind channel socket");
                Error::InvalidConfig
            })?;
            channels.insert(peer, Channel { socket, peer_addr });
        }

        Ok(Self { dv, config, channels })
    }

    fn channel(&self, node: NodeRole) -> Result<&Channel> {
        self.channels.get(&node).ok_or(Error::InvalidNode)
    }

    /// Send `buf` to `node`'s channel socket, followed by the 1-byte no-op
    /// flush datagram to port 2200 when `flush_workaround` is enabled.
    /// Increments the tx counter on success.
    pub fn send(&self, node: NodeRole, buf: &[u8]) -> Result<()> {
        if buf.is_empty() {
            return Err(Error::EmptyBuffer);
        }
        let channel = self.channel(node)?;
        let sent = channel.socket.send_to(buf, channel.peer_addr).map_err(|err| {
            tracing::error!(%err, node = %node, "sendto failed");
            Error::FailedToSendMsg
        })?;
        if sent != buf.len() {
            return Err(Error::UnexpectedSendSize);
        }

        if self.config.flush_workaround {
            let flush_addr = SocketAddrV4::new(*channel.peer_addr.ip(), NOOP_PORT);
            if let Err(err) = channel.socket.send_to(&[0u8], flush_addr) {
                tracing::warn!(%err, node = %node, "no-op flush send failed");
            }
        }

        self.dv.increment(self.config.tx_count_elem).or_else(|e| match e {
            Error::AlreadyMax => Ok(()),
            other => Err(other),
        })
    }

    /// Block until a datagram arrives on `node`'s channel, requiring an
    /// exact size match against `buf`. Increments the rx counter on
    /// success.
    pub fn recv_block(&self, node: NodeRole, buf: &mut [u8]) -> Result<()> {
        let channel = self.channel(node)?;
        channel.socket.set_nonblocking(false).map_err(|_| Error::FailedToRecvMsg)?;
        let (n, _) = channel.socket.recv_from(buf).map_err(|err| {
            tracing::error!(%err, node = %node, "recvfrom failed");
            Error::FailedToRecvMsg
        })?;
        if n != buf.len() {
            return Err(Error::UnexpectedRecvSize);
        }
        self.dv.increment(self.config.rx_count_elem).or_else(|e| match e {
            Error::AlreadyMax => Ok(()),
            other => Err(other),
        })
    }

    /// Like [`Self::recv_block`] but returns immediately with `got = false`
    /// when no datagram is pending.
    pub fn recv_nonblock(&self, node: NodeRole, buf: &mut [u8]) -> Result<bool> {
        let channel = self.channel(node)?;
        channel.socket.set_nonblocking(true).map_err(|_| Error::FailedToRecvMsg)?;
        match channel.socket.recv_from(buf) {
            Ok((n, _)) => {
                if n != buf.len() {
                    return Err(Error::UnexpectedRecvSize);
                }
                self.dv.increment(self.config.rx_count_elem).or_else(|e| match e {
                    Error::AlreadyMax => Ok(()),
                    other => Err(other),
                })?;
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => Ok(false),
            Err(err) => {
                tracing::error!(%err, node = %node, "recvfrom failed");
                Err(Error::FailedToRecvMsg)
            }
        }
    }

    /// Multiplex reads over `nodes`' channels using `select`, for up to
    /// `timeout_ns` (capped at 100s per `spec.md` §8 P9). `bufs[i]` is
    /// overwritten with each datagram received on `nodes[i]`'s channel, and
    /// `counts[i]` tallies how many were received.
    pub fn recv_mult(
        &self,
        timeout_ns: u64,
        nodes: &[NodeRole],
        bufs: &mut [Vec<u8>],
        counts: &mut [usize],
    ) -> Result<()> {
        if nodes.len() != bufs.len() || nodes.len() != counts.len() {
            return Err(Error::VectorsDiffSizes);
        }
        if timeout_ns > MAX_RECV_MULT_NS {
            return Err(Error::TimeoutTooLarge);
        }

        let mut channels = Vec::with_capacity(nodes.len());
        for node in nodes {
            channels.push(self.channel(*node)?);
        }
        for count in counts.iter_mut() {
            *count = 0;
        }

        let deadline = Instant::now() + Duration::from_nanos(timeout_ns);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }

            let mut fd_set = FdSet::new();
            for channel in &channels {
                fd_set.insert(channel.socket.as_fd());
            }
            let mut timeval = TimeVal::nanoseconds(remaining.as_nanos() as i64);
            let ready = select(None, Some(&mut fd_set), None, None, Some(&mut timeval)).map_err(|err| {
                tracing::error!(%err, "select() failed in recv_mult");
                Error::SelectFailed
            })?;
            if ready == 0 {
                return Ok(());
            }

            for (i, channel) in channels.iter().enumerate() {
                if !fd_set.contains(channel.socket.as_fd()) {
                    continue;
                }
                channel.socket.set_nonblocking(true).map_err(|_| Error::FailedToRecvMsg)?;
                match channel.socket.recv_from(&mut bufs[i]) {
                    Ok((n, _)) => {
                        if n != bufs[i].len() {
                            return Err(Error::UnexpectedRecvSize);
                        }
                        counts[i] += 1;
                        self.dv.increment(self.config.rx_count_elem).or_else(|e| match e {
                            Error::AlreadyMax => Ok(()),
                            other => Err(other),
                        })?;
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(err) => {
                        tracing::error!(%err, "recvfrom failed in recv_mult");
                        return Err(Error::FailedToRecvMsg);
                    }
                }
            }
        }
    }

    /// Send the clock-sync ready byte to `node` (Control Node startup only;
    /// see `SPEC_FULL.md` §2).
    pub fn send_clock_sync(&self, node: NodeRole) -> Result<()> {
        self.send(node, &[crate::topology::CLOCK_SYNC_READY])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsw_datavector::{DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};

    fn dv_with_counters() -> Arc<DataVector> {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![
                ElementConfig::new(ElementId(0), TypedValue::U32(0)),
                ElementConfig::new(ElementId(1), TypedValue::U32(0)),
            ],
        )]);
        Arc::new(DataVector::create(cfg).unwrap())
    }

    fn loopback_topology(me: NodeRole) -> TopologyConfig {
        use std::net::Ipv4Addr;
        TopologyConfig {
            nodes: vec![
                (NodeRole::Control, Ipv4Addr::new(127, 0, 0, 1)),
                (NodeRole::Device(0), Ipv4Addr::new(127, 0, 0, 2)),
            ],
            channels: vec![crate::topology::ChannelConfig::new(NodeRole::Control, NodeRole::Device(0), 2201)],
            me,
            tx_count_elem: ElementId(0),
            rx_count_elem: ElementId(1),
            flush_workaround: false,
        }
    }

    #[test]
    fn scenario_s6_round_trip() {
        let control_dv = dv_with_counters();
        let control_nm = NetworkManager::create(loopback_topology(NodeRole::Control), control_dv.clone()).unwrap();

        let device_dv = dv_with_counters();
        let device_nm = NetworkManager::create(loopback_topology(NodeRole::Device(0)), device_dv.clone()).unwrap();

        device_nm.send(NodeRole::Control, &[0xFF]).unwrap();
        let mut buf = vec![0u8; 1];
        control_nm.recv_block(NodeRole::Device(0), &mut buf).unwrap();
        assert_eq!(buf, vec![0xFF]);

        assert_eq!(device_dv.read::<u32>(ElementId(0)).unwrap(), 1);
        assert_eq!(control_dv.read::<u32>(ElementId(1)).unwrap(), 1);
    }

    #[test]
    fn send_refuses_empty_buffer() {
        let dv = dv_with_counters();
        let nm = NetworkManager::create(loopback_topology(NodeRole::Control), dv).unwrap();
        assert_eq!(nm.send(NodeRole::Device(0), &[]).unwrap_err(), Error::EmptyBuffer);
    }

    #[test]
    fn scenario_s7_multi_recv_timeout() {
        let dv = dv_with_counters();
        let nm = NetworkManager::create(loopback_topology(NodeRole::Control), dv).unwrap();
        let mut bufs = vec![vec![0u8; 1]];
        let mut counts = vec![0usize];
        let start = Instant::now();
        nm.recv_mult(1_000_000, &[NodeRole::Device(0)], &mut bufs, &mut counts).unwrap();
        let elapsed = start.elapsed();
        assert_eq!(counts, vec![0]);
        assert!(elapsed >= Duration::from_millis(1));
    }

    #[test]
    fn recv_mult_rejects_mismatched_vectors() {
        let dv = dv_with_counters();
        let nm = NetworkManager::create(loopback_topology(NodeRole::Control), dv).unwrap();
        let mut bufs = vec![vec![0u8; 1]];
        let mut counts = vec![0usize, 0usize];
        assert_eq!(
            nm.recv_mult(0, &[NodeRole::Device(0)], &mut bufs, &mut counts).unwrap_err(),
            Error::VectorsDiffSizes
        );
    }

    #[test]
    fn recv_mult_rejects_oversized_timeout() {
        let dv = dv_with_counters();
        let nm = NetworkManager::create(loopback_topology(NodeRole::Control), dv).unwrap();
        let mut bufs = vec![vec![0u8; 1]];
        let mut counts = vec![0usize];
        assert_eq!(
            nm.recv_mult(MAX_RECV_MULT_NS + 1, &[NodeRole::Device(0)], &mut bufs, &mut counts).unwrap_err(),
            Error::TimeoutTooLarge
        );
    }
}
