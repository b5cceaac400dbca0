use std::sync::Arc;
use std::time::Duration;

use fsw_control::Controller;
use fsw_datavector::{DataVector, DvConfig, ElementId, RegionId, increment_on_error};
use fsw_device::{Device, FpgaSession};
use fsw_errors::{Error, Result};
use fsw_net::{NetworkManager, NodeRole, TopologyConfig};
use fsw_threads::{Affinity, ThreadManager};
use fsw_time::Clock;

/// The sensor/controller/actuator set a Device Node runs each tick, built by
/// the caller's init hook once startup assembly has produced a live Data
/// Vector, FPGA session, and clock (`spec.md` §4.11, §4.12).
pub struct DeviceNodeComponents {
    pub sensors: Vec<Box<dyn Device + Send>>,
    pub controllers: Vec<Box<dyn Controller + Send>>,
    pub actuators: Vec<Box<dyn Device + Send>>,
}

/// Construction config for [`run_device_node`].
pub struct DeviceNodeConfig {
    pub dv_config: DvConfig,
    pub net_config: TopologyConfig,
    /// Region copied to the Control Node each tick.
    pub send_region: RegionId,
    /// Region the Control Node's reply is written into each tick.
    pub recv_region: RegionId,
    /// Integer element incremented once per completed loop iteration.
    pub loop_counter: ElementId,
    /// Integer element incremented whenever a per-step operation fails.
    pub error_counter: ElementId,
    /// Integer element incremented when the loop thread misses a deadline.
    pub deadline_miss_counter: ElementId,
    pub tick_period: Duration,
    pub loop_priority: i32,
    pub loop_affinity: Affinity,
    /// Skip the startup clock-sync handshake (`spec.md` §6). Left `true`
    /// only for harnesses and the loopback demo that have no Control Node
    /// counterpart sending the ready byte.
    pub skip_clock_sync: bool,
}

/// Copy the outbound region out, rendezvous with the Control Node, and copy
/// the reply into the inbound region — the five wire-level steps of
/// `spec.md` §4.11, run as a single unit so a failure partway through counts
/// once and leaves the rest of the loop body to run regardless
/// (`original_source/fsw/src/DeviceNode.cpp`'s `recvAndSendDataVectorData`).
fn exchange_with_control(
    dv: &DataVector,
    nm: &NetworkManager,
    send_region: RegionId,
    recv_region: RegionId,
    send_buf: &mut [u8],
    recv_buf: &mut [u8],
) -> Result<()> {
    dv.read_region(send_region, send_buf)?;
    nm.recv_block(NodeRole::Control, recv_buf)?;
    nm.send(NodeRole::Control, send_buf)?;
    let _ = nm.recv_nonblock(NodeRole::Control, recv_buf)?;
    dv.write_region(recv_region, recv_buf)?;
    Ok(())
}

/// Assemble and run a Device Node: topology/Data-Vector construction,
/// optional clock sync, FPGA/controller/device init via `init`, then the
/// fixed per-tick sequence of `spec.md` §4.11 on its own periodic thread.
///
/// Blocks on the loop thread for the lifetime of the process; returns only
/// if the loop thread's error handler decides a failure is fatal (timer
/// subsystem failure, or an escaped body error). Every failure before the
/// loop starts is also returned, never retried — callers pass the result to
/// [`fsw_errors::exit_on_error`] at the top level, per `spec.md` §4.12.
pub fn run_device_node(
    config: DeviceNodeConfig,
    fpga: Arc<dyn FpgaSession>,
    init: impl FnOnce(&Arc<DataVector>, &Arc<dyn FpgaSession>, &Clock) -> Result<DeviceNodeComponents>,
) -> Result<()> {
    let send_region = config.send_region;
    let recv_region = config.recv_region;
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
        let mut sync_buf = [0u8; 1];
        nm.recv_block(NodeRole::Control, &mut sync_buf)?;
        tracing::info!("clock sync received from Control Node");
    }

    let clock = Clock::new()?;
    let DeviceNodeComponents { mut sensors, mut controllers, mut actuators } = init(&dv, &fpga, &clock)?;

    let mut send_buf = vec![0u8; dv.region_size_bytes(send_region)?];
    let mut recv_buf = vec![0u8; dv.region_size_bytes(recv_region)?];

    let body_dv = dv.clone();
    let body = move || -> Result<()> {
        increment_on_error(
            exchange_with_control(&body_dv, &nm, send_region, recv_region, &mut send_buf, &mut recv_buf),
            &body_dv,
            error_counter,
        )?;

        for sensor in sensors.iter_mut() {
            increment_on_error(sensor.run(&body_dv), &body_dv, error_counter)?;
        }
        for controller in controllers.iter_mut() {
            increment_on_error(controller.tick(&body_dv), &body_dv, error_counter)?;
        }
        for actuator in actuators.iter_mut() {
            increment_on_error(actuator.run(&body_dv), &body_dv, error_counter)?;
        }

        increment_on_error(body_dv.increment(loop_counter), &body_dv, error_counter)?;
        Ok(())
    };

    let handler_dv = dv.clone();
    let error_handler = move |err: Error| -> Result<()> {
        match err {
            Error::MissedSchedulerDeadline => {
                tracing::warn!("device node loop missed its deadline");
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
