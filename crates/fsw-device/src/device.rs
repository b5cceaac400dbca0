use fsw_datavector::DataVector;
use fsw_errors::Result;

/// A sensor or actuator bound to one FPGA session and one Data Vector
/// (`spec.md` §4.10). Unlike a Controller, a Device has no mode gate:
/// `run()` is called unconditionally every tick by whichever phase of the
/// Device-Node loop it was registered under (sensor, controller, or
/// actuator — `spec.md` §4.11 steps 6–8).
pub trait Device {
    fn run(&mut self, dv: &DataVector) -> Result<()>;
}
