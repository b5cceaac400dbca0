//! Node assembly: the Device-Node and Control-Node tick loops, wiring the
//! Data Vector, Network Manager, Thread Manager, State Machine, Command
//! Handler, and Controller/Device traits into the two kinds of process this
//! workspace ships (`spec.md` §4.11, §4.12).

mod control_node;
mod device_node;

pub use control_node::{ControlNodeComponents, ControlNodeConfig, DeviceChannel, run_control_node};
pub use device_node::{DeviceNodeComponents, DeviceNodeConfig, run_device_node};
