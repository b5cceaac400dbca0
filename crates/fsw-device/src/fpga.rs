use fsw_errors::Result;

/// A digital I/O line identifier on the FPGA's sbRIO-class target, in
/// `[MIN_PIN, MAX_PIN]` (`spec.md` §4.10).
pub const MIN_PIN: u8 = 5;
pub const MAX_PIN: u8 = 27;

/// The process-wide FPGA session contract (`original_source/fsw/include/Fpga.hpp`).
///
/// A concrete board driver is out of scope for this workspace; `fsw-node`'s
/// assembly function opens one implementation and hands devices a
/// `&dyn FpgaSession` so they never touch the board directly. Correctness
/// relies on every `run()` call happening on the Device Node's single loop
/// thread (`spec.md` §5) — this trait takes `&self`, not `&mut self`, to
/// reflect that devices share one session without their own locking.
pub trait FpgaSession: Send + Sync {
    /// Configure `pin` as a digital output and drive it to `value`.
    fn configure_digital_out(&self, pin: u8, value: bool) -> Result<()>;

    /// Drive an already-configured digital output pin.
    fn write_digital(&self, pin: u8, value: bool) -> Result<()>;

    /// Read a digital line's current value (input or output).
    fn read_digital(&self, pin: u8) -> Result<bool>;
}

pub(crate) fn validate_pin(pin: u8) -> Result<()> {
    if (MIN_PIN..=MAX_PIN).contains(&pin) {
        Ok(())
    } else {
        Err(fsw_errors::Error::PinNotConfigured)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// An in-memory `FpgaSession` for device unit tests: tracks the last
    /// value written per pin and echoes it back on read, as if the pin were
    /// looped back to its own feedback line.
    ///
    /// `Mutex`, not `RefCell`: `FpgaSession: Send + Sync` and `RefCell` is
    /// never `Sync`.
    #[derive(Default)]
    pub struct FakeFpga {
        pins: Mutex<HashMap<u8, bool>>,
    }

    impl FpgaSession for FakeFpga {
        fn configure_digital_out(&self, pin: u8, value: bool) -> Result<()> {
            self.pins.lock().unwrap().insert(pin, value);
            Ok(())
        }

        fn write_digital(&self, pin: u8, value: bool) -> Result<()> {
            self.pins.lock().unwrap().insert(pin, value);
            Ok(())
        }

        fn read_digital(&self, pin: u8) -> Result<bool> {
            Ok(*self.pins.lock().unwrap().get(&pin).unwrap_or(&false))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_pin_outside_range() {
        assert!(validate_pin(4).is_err());
        assert!(validate_pin(5).is_ok());
        assert!(validate_pin(27).is_ok());
        assert!(validate_pin(28).is_err());
    }
}
