//! A Device Node and a Control Node, each running its full tick loop in its
//! own OS thread of this one demo process, wired together over loopback UDP
//! exactly as the `device_node`/`control_node` binaries would be across two
//! processes. Exercises the whole node-assembly path — topology, Data
//! Vector, State Machine, Command Handler, Device — without needing a
//! second machine or process.
//!
//! Needs the same real-time privileges (`CAP_SYS_NICE`, an unlocked memory
//! limit) the two binaries need, since it drives the same
//! `ThreadManager::init` path they do.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fsw_control::{CmdKind, CommandHandler, CommandHandlerConfig};
use fsw_datavector::{DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};
use fsw_device::{DigitalOutConfig, DigitalOutDevice, FpgaSession};
use fsw_net::{ChannelConfig, NodeRole, TopologyConfig};
use fsw_node::{
    ControlNodeComponents, ControlNodeConfig, DeviceChannel, DeviceNodeComponents, DeviceNodeConfig,
    run_control_node, run_device_node,
};
use fsw_statemachine::{ActionEntry, Comparison, Guard, StateConfig, StateId, StateMachine, StateMachineConfig};
use fsw_threads::Affinity;

const IGNITER_CMD: ElementId = ElementId(0);
const IGNITER_FEEDBACK: ElementId = ElementId(1);
const TX_COUNT: ElementId = ElementId(2);
const RX_COUNT: ElementId = ElementId(3);
const ERROR_COUNT: ElementId = ElementId(4);
const LOOP_COUNT: ElementId = ElementId(5);
const DEADLINE_MISS_COUNT: ElementId = ElementId(6);
const STATE: ElementId = ElementId(7);
const CMD: ElementId = ElementId(8);
const CMD_REQ: ElementId = ElementId(9);
const CMD_WRITE_ELEM: ElementId = ElementId(10);
const CMD_WRITE_VAL: ElementId = ElementId(11);
const CMD_REQ_NUM: ElementId = ElementId(12);
const LAST_CMD_PROC_NUM: ElementId = ElementId(13);

const CMD_REGION: RegionId = RegionId(0);
const TELEMETRY_REGION: RegionId = RegionId(1);
const LOCAL_REGION: RegionId = RegionId(2);

const SAFED: StateId = StateId(0);
const ARMED: StateId = StateId(1);

const IGNITER_PIN: u8 = 10;

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

fn device_dv_config() -> DvConfig {
    DvConfig::new(vec![
        RegionConfig::new(TELEMETRY_REGION, vec![ElementConfig::new(IGNITER_FEEDBACK, TypedValue::Bool(false))]),
        RegionConfig::new(CMD_REGION, vec![ElementConfig::new(IGNITER_CMD, TypedValue::Bool(false))]),
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

fn control_dv_config() -> DvConfig {
    DvConfig::new(vec![
        RegionConfig::new(CMD_REGION, vec![ElementConfig::new(IGNITER_CMD, TypedValue::Bool(false))]),
        RegionConfig::new(TELEMETRY_REGION, vec![ElementConfig::new(IGNITER_FEEDBACK, TypedValue::Bool(false))]),
        RegionConfig::new(
            LOCAL_REGION,
            vec![
                ElementConfig::new(TX_COUNT, TypedValue::U32(0)),
                ElementConfig::new(RX_COUNT, TypedValue::U32(0)),
                ElementConfig::new(ERROR_COUNT, TypedValue::U32(0)),
                ElementConfig::new(LOOP_COUNT, TypedValue::U32(0)),
                ElementConfig::new(DEADLINE_MISS_COUNT, TypedValue::U32(0)),
                ElementConfig::new(STATE, TypedValue::U32(SAFED.0)),
                ElementConfig::new(CMD, TypedValue::U8(CmdKind::None as u8)),
                ElementConfig::new(CMD_REQ, TypedValue::U8(CmdKind::None as u8)),
                ElementConfig::new(CMD_WRITE_ELEM, TypedValue::U32(0)),
                ElementConfig::new(CMD_WRITE_VAL, TypedValue::U64(0)),
                ElementConfig::new(CMD_REQ_NUM, TypedValue::U32(0)),
                ElementConfig::new(LAST_CMD_PROC_NUM, TypedValue::U32(0)),
            ],
        ),
    ])
}

fn topology(me: NodeRole) -> TopologyConfig {
    TopologyConfig {
        nodes: vec![
            (NodeRole::Control, Ipv4Addr::new(127, 0, 0, 1)),
            (NodeRole::Device(0), Ipv4Addr::new(127, 0, 0, 2)),
        ],
        channels: vec![ChannelConfig::new(NodeRole::Control, NodeRole::Device(0), 2201)],
        me,
        tx_count_elem: TX_COUNT,
        rx_count_elem: RX_COUNT,
        flush_workaround: false,
    }
}

fn run_device() {
    let config = DeviceNodeConfig {
        dv_config: device_dv_config(),
        net_config: topology(NodeRole::Device(0)),
        send_region: TELEMETRY_REGION,
        recv_region: CMD_REGION,
        loop_counter: LOOP_COUNT,
        error_counter: ERROR_COUNT,
        deadline_miss_counter: DEADLINE_MISS_COUNT,
        tick_period: Duration::from_millis(10),
        loop_priority: 10,
        loop_affinity: Affinity::Core1,
        // No Control Node counterpart sending the ready byte in this demo.
        skip_clock_sync: true,
    };
    let fpga: Arc<dyn FpgaSession> = Arc::new(LoopbackFpga::default());

    let result = run_device_node(config, fpga, |dv, fpga, _clock| {
        let igniter = DigitalOutDevice::new(
            fpga.clone(),
            dv,
            DigitalOutConfig { control_value: IGNITER_CMD, feedback_value: IGNITER_FEEDBACK, pin: IGNITER_PIN },
        )?;
        Ok(DeviceNodeComponents { sensors: vec![], controllers: vec![], actuators: vec![Box::new(igniter)] })
    });
    if let Err(err) = result {
        tracing::error!(%err, "device node loop exited");
    }
}

fn run_control() {
    let config = ControlNodeConfig {
        dv_config: control_dv_config(),
        net_config: topology(NodeRole::Control),
        devices: vec![DeviceChannel {
            role: NodeRole::Device(0),
            send_region: CMD_REGION,
            recv_region: TELEMETRY_REGION,
        }],
        loop_counter: LOOP_COUNT,
        error_counter: ERROR_COUNT,
        deadline_miss_counter: DEADLINE_MISS_COUNT,
        tick_period: Duration::from_millis(10),
        loop_priority: 10,
        loop_affinity: Affinity::Core1,
        skip_clock_sync: true,
    };

    let result = run_control_node(config, |dv, _clock| {
        let states = vec![
            StateConfig::new(
                SAFED,
                vec![(0, vec![ActionEntry::new(IGNITER_CMD, TypedValue::Bool(false))])],
                vec![Guard::new(CMD, Comparison::Eq, TypedValue::U8(CmdKind::Launch as u8), ARMED)],
            ),
            StateConfig::new(
                ARMED,
                vec![(0, vec![ActionEntry::new(IGNITER_CMD, TypedValue::Bool(true))])],
                vec![Guard::new(CMD, Comparison::Eq, TypedValue::U8(CmdKind::Abort as u8), SAFED)],
            ),
        ];
        let state_machine = StateMachine::create(dv.clone(), StateMachineConfig { state_element: STATE, states })?;
        let command_handler = CommandHandler::new(CommandHandlerConfig {
            cmd_req: CMD_REQ,
            cmd: CMD,
            cmd_write_elem: CMD_WRITE_ELEM,
            cmd_write_val: CMD_WRITE_VAL,
            cmd_req_num: CMD_REQ_NUM,
            last_cmd_proc_num: LAST_CMD_PROC_NUM,
        });
        Ok(ControlNodeComponents { state_machine, command_handler, controllers: vec![] })
    });
    if let Err(err) = result {
        tracing::error!(%err, "control node loop exited");
    }
}

fn main() {
    tracing_subscriber::fmt().init();

    let device_handle = std::thread::spawn(run_device);
    // Give the Device Node's socket a head start before Control starts
    // sending, same ordering `ThreadManager::init` imposes in a real
    // two-process deployment.
    std::thread::sleep(Duration::from_millis(50));
    let control_handle = std::thread::spawn(run_control);

    std::thread::sleep(Duration::from_secs(3));
    println!("loopback demo ran for 3s; both node loops are still live (a healthy loop never returns)");
    // The loop threads never return in a healthy run; exit the process
    // rather than join them.
    std::process::exit(0);

    #[allow(unreachable_code)]
    {
        let _ = device_handle.join();
        let _ = control_handle.join();
    }
}
