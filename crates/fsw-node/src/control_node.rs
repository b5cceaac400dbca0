use std::sync::Arc;
use std::time::Duration;

use fsw_control::{CommandHandler, Controller};
use fsw_datavector::{DataVector, DvConfig, ElementId, RegionId, increment_on_error};
use fsw_errors::{Error, Result};
use fsw_net::{NetworkManager, NodeRole, TopologyConfig};
use fsw_statemachine::{StateMachine, StateMachineConfig};
use fsw_threads::{Affinity, ThreadManager};
use fsw_time::Clock;

/// One Device Node's wire channel from the Control Node's perspective: the
/// region sent to it each tick and the region its reply is written into.
#[derive(Debug, Clone, Copy)]
pub struct DeviceChannel {
    pub role: NodeRole,
    pub send_region: RegionId,
    pub recv_region: RegionId,
}

/// The state machine, command handler, and high-level controllers a Control
/// Node runs each tick, built by the caller's init hook once the Data Vector
/// and clock exist.
pub struct ControlNodeComponents {
    pub state_machine: StateMachine,
    pub command_handler: CommandHandler,
    pub controllers: Vec<Box<dyn Controller + Send>>,
}

/// Construction config for [`run_control_node`].
pub struct ControlNodeConfig {
    pub dv_config: DvConfig,
    pub net_config: TopologyConfig,
    pub devices: Vec<DeviceChannel>,
    pub loop_counter: ElementId,
    pub error_counter: ElementId,
    pub deadline_miss_counter: ElementId,
    pub tick_period: Duration,
    pub loop_priority: i32,
    pub loop_affinity: Affinity,
    /// Skip sending the startup clock-sync byte to every Device Node
    /// (`spec.md` §6). Left `true` only for harnesses and the loopback demo.
    pub skip_clock_sync: bool,
}

/// One Device Node's exchange: copy its outbound region out, send it,
/// block for its reply, drain the flush datagram, copy the reply in.
///
/// This is the mirror of `device_node::exchange_with_control` — see
/// `DESIGN.md`'s "Open Questions — resolved" #1 for why the Control Node
/// must send first: a Device Node's first network operation each tick is a
/// blocking receive, so nothing would ever complete if both sides waited to
/// receive before sending.
fn exchange_with_device(
    dv: &DataVector,
    nm: &NetworkManager,
    device: DeviceChannel,
    send_buf: &mut [u8],
    recv_buf: &mut [u8],
) -> Result<()> {
    dv.read_region(device.send_region, send_buf)?;
    nm.send(device.role, send_buf)?;
    nm.recv_block(device.role, recv_buf)?;
    let _ = nm.recv_nonblock(device.role, recv_buf)?;
    dv.write_region(device.recv_region, recv_buf)?;
    Ok(())
}

/// Assemble and run a Control Node: topology/Data-Vector construction,
/// optional clock-sync fanout, state-machine/command-handler/controller
/// init via `init`, then the per-tick sequence on its own periodic thread.
///
/// Each tick: exchange with every Device Node in config order, run the
/// Command Handler (so a freshly-ingested ground command is visible to this
/// tick's transition guards), tick the state machine, then run every
/// high-level controller. Blocks on the loop thread for the life of the
/// process; see [`crate::device_node::run_device_node`] for the return/exit
/// discipline, which this mirrors.
pub fn run_control_node(
    config: ControlNodeConfig,
    init: impl FnOnce(&Arc<DataVector>, &Clock) -> Result<ControlNodeComponents>,
) -> Result<()> {
    let devices = config.devices;
    let loop_counter = config.loop_counter;
    let error_counter = config.error_counter;
    let deadline_miss_counter = config.deadline_miss_counter;
    let tick_period = config.tick_period;
    let loop_priority = config.loop_priority;
    let loop_affinity = config.loop_affinity;

    let threads = ThreadManager::init()?;
    let dv = Arc::new(DataVector::create(config.dv_config)?);
    let nm = NetworkManager::create(config.net_config, dv.clone())?;

    if !config.skip_clock_sync {
        for device in &devices {
            nm.send_clock_sync(device.role)?;
        }
        tracing::info!(count = devices.len(), "clock sync sent to device nodes");
    }

    let clock = Clock::new()?;
    let ControlNodeComponents { mut state_machine, command_handler, mut controllers } = init(&dv, &clock)?;

    let mut bufs: Vec<(Vec<u8>, Vec<u8>)> = devices
        .iter()
        .map(|d| -> Result<(Vec<u8>, Vec<u8>)> {
            Ok((vec![0u8; dv.region_size_bytes(d.send_region)?], vec![0u8; dv.region_size_bytes(d.recv_region)?]))
        })
        .collect::<Result<_>>()?;

    let mut state_entry_ns = clock.now_ns()?;
    let body_dv = dv.clone();
    let body = move || -> Result<()> {
        for (device, (send_buf, recv_buf)) in devices.iter().zip(bufs.iter_mut()) {
            increment_on_error(
                exchange_with_device(&body_dv, &nm, *device, send_buf, recv_buf),
                &body_dv,
                error_counter,
            )?;
        }

        increment_on_error(command_handler.tick(&body_dv), &body_dv, error_counter)?;

        let prev_state = state_machine.current();
        let elapsed_ns_in_state = clock.now_ns()?.saturating_sub(state_entry_ns);
        increment_on_error(state_machine.tick(elapsed_ns_in_state), &body_dv, error_counter)?;
        if state_machine.current() != prev_state {
            state_entry_ns = clock.now_ns()?;
        }

        for controller in controllers.iter_mut() {
            increment_on_error(controller.tick(&body_dv), &body_dv, error_counter)?;
        }

        increment_on_error(body_dv.increment(loop_counter), &body_dv, error_counter)?;
        Ok(())
    };

    let handler_dv = dv.clone();
    let error_handler = move |err: Error| -> Result<()> {
        match err {
            Error::MissedSchedulerDeadline => {
                tracing::warn!("control node loop missed its deadline");
                match handler_dv.increment(deadline_miss_counter) {
                    Ok(()) | Err(Error::AlreadyMax) => Ok(()),
                    Err(other) => Err(other),
                }
            }
            other => Err(other),
        }
    };

    let handle = threads.create_periodic_thread(loop_priority, loop_affinity, tick_period, body, error_handler)?;
    threads.wait_for_thread(handle)
}
