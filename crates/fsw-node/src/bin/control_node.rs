//! Control Node process: one ground-commandable igniter line, gated by a
//! two-state (Safed/Armed) state machine, driving a single Device Node over
//! loopback UDP. Topology and Data Vector schema are compiled in — see
//! `device_node`'s module doc for why.

use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Result;
use fsw_control::{CmdKind, CommandHandler, CommandHandlerConfig};
use fsw_datavector::{DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};
use fsw_errors::exit_on_error;
use fsw_net::{ChannelConfig, NodeRole, TopologyConfig};
use fsw_node::{ControlNodeComponents, ControlNodeConfig, DeviceChannel, run_control_node};
use fsw_statemachine::{ActionEntry, Comparison, Guard, StateConfig, StateId, StateMachine, StateMachineConfig};
use fsw_threads::Affinity;
use tracing_subscriber::EnvFilter;

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

const CMD_TO_DEVICE0_REGION: RegionId = RegionId(0);
const TELEMETRY_FROM_DEVICE0_REGION: RegionId = RegionId(1);
const LOCAL_REGION: RegionId = RegionId(2);

const SAFED: StateId = StateId(0);
const ARMED: StateId = StateId(1);

fn dv_config() -> DvConfig {
    DvConfig::new(vec![
        RegionConfig::new(CMD_TO_DEVICE0_REGION, vec![ElementConfig::new(IGNITER_CMD, TypedValue::Bool(false))]),
        RegionConfig::new(
            TELEMETRY_FROM_DEVICE0_REGION,
            vec![ElementConfig::new(IGNITER_FEEDBACK, TypedValue::Bool(false))],
        ),
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

fn net_config() -> TopologyConfig {
    TopologyConfig {
        nodes: vec![
            (NodeRole::Control, Ipv4Addr::new(127, 0, 0, 1)),
            (NodeRole::Device(0), Ipv4Addr::new(127, 0, 0, 2)),
        ],
        channels: vec![ChannelConfig::new(NodeRole::Control, NodeRole::Device(0), 2201)],
        me: NodeRole::Control,
        tx_count_elem: TX_COUNT,
        rx_count_elem: RX_COUNT,
        flush_workaround: true,
    }
}

/// Safed: igniter held low, armed on a ground `Launch` command. Armed:
/// igniter driven high, disarmed back to Safed on `Abort`.
fn state_machine_config() -> StateMachineConfig {
    StateMachineConfig {
        state_element: STATE,
        states: vec![
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
        ],
    }
}

fn command_handler_config() -> CommandHandlerConfig {
    CommandHandlerConfig {
        cmd_req: CMD_REQ,
        cmd: CMD,
        cmd_write_elem: CMD_WRITE_ELEM,
        cmd_write_val: CMD_WRITE_VAL,
        cmd_req_num: CMD_REQ_NUM,
        last_cmd_proc_num: LAST_CMD_PROC_NUM,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fsw_node=info".parse()?))
        .init();

    let config = ControlNodeConfig {
        dv_config: dv_config(),
        net_config: net_config(),
        devices: vec![DeviceChannel {
            role: NodeRole::Device(0),
            send_region: CMD_TO_DEVICE0_REGION,
            recv_region: TELEMETRY_FROM_DEVICE0_REGION,
        }],
        loop_counter: LOOP_COUNT,
        error_counter: ERROR_COUNT,
        deadline_miss_counter: DEADLINE_MISS_COUNT,
        tick_period: Duration::from_millis(10),
        loop_priority: 10,
        loop_affinity: Affinity::Core1,
        skip_clock_sync: false,
    };

    let result = run_control_node(config, |dv, _clock| {
        let state_machine = StateMachine::create(dv.clone(), state_machine_config())?;
        let command_handler = CommandHandler::new(command_handler_config());
        Ok(ControlNodeComponents { state_machine, command_handler, controllers: vec![] })
    });

    exit_on_error(result, "control node loop exited");
    Ok(())
}
