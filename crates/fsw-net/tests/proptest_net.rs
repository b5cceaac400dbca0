use std::net::Ipv4Addr;
use std::sync::Arc;

use fsw_datavector::{DataVector, DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};
use fsw_net::{ChannelConfig, NetworkManager, NodeRole, TopologyConfig};
use proptest::prelude::*;

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

fn topology(me: NodeRole, third_octet: u8, port: u16) -> TopologyConfig {
    TopologyConfig {
        nodes: vec![
            (NodeRole::Control, Ipv4Addr::new(127, 0, third_octet, 1)),
            (NodeRole::Device(0), Ipv4Addr::new(127, 0, third_octet, 2)),
        ],
        channels: vec![ChannelConfig::new(NodeRole::Control, NodeRole::Device(0), port)],
        me,
        tx_count_elem: ElementId(0),
        rx_count_elem: ElementId(1),
        flush_workaround: false,
    }
}

proptest! {
    /// P8: `send` refuses an empty buffer and always transmits exactly
    /// `buf.len()` bytes otherwise.
    #[test]
    fn p8_send_transmits_full_buffer(
        third_octet in 1u8..200,
        port in 2201u16..2299,
        payload in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let control_dv = dv_with_counters();
        let control_nm = NetworkManager::create(topology(NodeRole::Control, third_octet, port), control_dv).unwrap();
        let device_dv = dv_with_counters();
        let device_nm = NetworkManager::create(topology(NodeRole::Device(0), third_octet, port), device_dv.clone()).unwrap();

        device_nm.send(NodeRole::Control, &payload).unwrap();
        let mut buf = vec![0u8; payload.len()];
        control_nm.recv_block(NodeRole::Device(0), &mut buf).unwrap();
        prop_assert_eq!(buf, payload);
        prop_assert_eq!(device_dv.read::<u32>(ElementId(0)).unwrap(), 1);

        prop_assert_eq!(device_nm.send(NodeRole::Control, &[]).unwrap_err(), fsw_errors::Error::EmptyBuffer);
    }
}
