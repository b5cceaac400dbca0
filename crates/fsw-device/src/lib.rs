//! Device base trait and the DigitalOut specimen, plus the FPGA session
//! contract devices share (`spec.md` §4.10).

mod device;
mod digital_out;
mod fpga;

pub use device::Device;
pub use digital_out::{DigitalOutConfig, DigitalOutDevice};
pub use fpga::{FpgaSession, MAX_PIN, MIN_PIN};
