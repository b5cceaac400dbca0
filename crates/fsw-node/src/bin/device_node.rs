//! Device Node process: one digital-out actuator (an igniter line) driven
//! from a Control Node over loopback UDP. The topology and Data Vector
//! schema are compiled in, mirroring the original flight tree's per-node
//! static tables — `spec.md` §6 rules out a command-line or environment-
//! variable surface for the core, and that extends to how a deployment
//! names its own node.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use fsw_datavector::{DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};
use fsw_device::{DigitalOutConfig, DigitalOutDevice, FpgaSession};
use fsw_errors::exit_on_error;
use fsw_net::{ChannelConfig, NodeRole, TopologyConfig};
use fsw_node::{DeviceNodeComponents, DeviceNodeConfig, run_device_node};
use fsw_threads::Affinity;
use tracing_subscriber::EnvFilter;

const IGNITER_FEEDBACK: ElementId = ElementId(0);
const IGNITER_CONTROL: ElementId = ElementId(1);
const TX_COUNT: ElementId = ElementId(2);
const RX_COUNT: ElementId = ElementId(3);
const ERROR_COUNT: ElementId = ElementId(4);
const LOOP_COUNT: ElementId = ElementId(5);
const DEADLINE_MISS_COUNT: ElementId = ElementId(6);

const TELEMETRY_REGION: RegionId = RegionId(0);
const COMMAND_REGION: RegionId = RegionId(1);
const LOCAL_REGION: RegionId = RegionId(2);

const IGNITER_PIN: u8 = 10;

/// A loopback stand-in for a real FPGA digital I/O driver. A concrete board
/// driver is out of scope for this workspace (see `fsw-device`'s
/// `FpgaSession` doc comment) — this just echoes back whatever was last
/// written to a pin, so the process has something to drive.
#[derive(Default)]
struct LoopbackFpga {
    pins: Mutex<HashMap<u8, bool>>,
}

impl FpgaSession for LoopbackFpga {
    fn configure_digital_out(&self, pin: u8, value: bool) -> fsw_errors::Result<()> {
        self.pins.lock().unwrap().insert(pin, value);
        Ok(())
    }

    fn write_digital(&self, pin: u8, value: bool) -> fsw_errors::Result<()> {
        self.pins.lock().unwrap().insert(pin, value);
        Ok(())
    }

    fn read_digital(&self, pin: u8) -> fsw_errors::Result<bool> {
        Ok(*self.pins.lock().unwrap().get(&pin).unwrap_or(&false))
    }
}

fn dv_config() -> DvConfig {
    DvConfig::new(vec![
        RegionConfig::new(TELEMETRY_REGION, vec![ElementConfig::new(IGNITER_FEEDBACK, TypedValue::Bool(false))]),
        RegionConfig::new(COMMAND_REGION, vec![ElementConfig::new(IGNITER_CONTROL, TypedValue::Bool(false))]),
        RegionConfig::new(
            LOCAL_REGION,
            vec![
                ElementConfig::new(TX_COUNT, TypedValue::U32(0)),
                ElementConfig::new(RX_COUNT, TypedValue::U32(0)),
                ElementConfig::new(ERROR_COUNT, TypedValue::U32(0)),
                ElementConfig::new(LOOP_COUNT, TypedValue::U32(0)),
                ElementConfig::new(DEADLINE_MISS_COUNT, TypedValue::U32(0)),
            ],
        ),
    ])
}

fn net_config() -> TopologyConfig {
    TopologyConfig {
        nodes: vec![
            (NodeRole::Control, Ipv4Addr::new(127, 0, 0, 1)),
            (NodeRole::Device(0), Ipv4Addr::new(127, 0, 0, 2)),
        ],
        channels: vec![ChannelConfig::new(NodeRole::Control, NodeRole::Device(0), 2201)],
        me: NodeRole::Device(0),
        tx_count_elem: TX_COUNT,
        rx_count_elem: RX_COUNT,
        flush_workaround: true,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fsw_node=info".parse()?))
        .init();

    let config = DeviceNodeConfig {
        dv_config: dv_config(),
        net_config: net_config(),
        send_region: TELEMETRY_REGION,
        recv_region: COMMAND_REGION,
        loop_counter: LOOP_COUNT,
        error_counter: ERROR_COUNT,
        deadline_miss_counter: DEADLINE_MISS_COUNT,
        tick_period: Duration::from_millis(10),
        loop_priority: 10,
        loop_affinity: Affinity::Core1,
        skip_clock_sync: false,
    };

    let fpga: Arc<dyn FpgaSession> = Arc::new(LoopbackFpga::default());

    let result = run_device_node(config, fpga, |dv, fpga, _clock| {
        let igniter = DigitalOutDevice::new(
            fpga.clone(),
            dv,
            DigitalOutConfig { control_value: IGNITER_CONTROL, feedback_value: IGNITER_FEEDBACK, pin: IGNITER_PIN },
        )?;
        Ok(DeviceNodeComponents { sensors: vec![], controllers: vec![], actuators: vec![Box::new(igniter)] })
    });

    exit_on_error(result, "device node loop exited");
    Ok(())
}
