use std::sync::Arc;

use fsw_datavector::{DataVector, ElementId};
use fsw_errors::{Error, Result};

use crate::device::Device;
use crate::fpga::{validate_pin, FpgaSession};

/// Config for the [`DigitalOutDevice`] specimen (`spec.md` §4.10).
#[derive(Debug, Clone, Copy)]
pub struct DigitalOutConfig {
    /// Data Vector element (`bool`) read to determine the value to set.
    pub control_value: ElementId,
    /// Data Vector element (`bool`) the pin's read-back value is written to.
    pub feedback_value: ElementId,
    /// FPGA digital line, in `[MIN_PIN, MAX_PIN]`.
    pub pin: u8,
}

/// Drives a digital output pin from a Data Vector control element and
/// reports the pin's read-back value to a feedback element.
///
/// Construction configures the pin as an output; `run()` reads the control
/// value, writes it to the pin, reads the pin back, and writes that
/// feedback value — mirroring
/// `original_source/src/DigitalOutDevice.cpp`'s `updateFpgaControlValue`
/// then feedback-read split.
pub struct DigitalOutDevice {
    fpga: Arc<dyn FpgaSession>,
    config: DigitalOutConfig,
}

impl DigitalOutDevice {
    /// Validate `config` against the Data Vector schema and the FPGA's pin
    /// range, configure the pin as an output at its initial control value,
    /// and return the device.
    pub fn new(
        fpga: Arc<dyn FpgaSession>,
        dv: &DataVector,
        config: DigitalOutConfig,
    ) -> Result<Self> {
        validate_pin(config.pin)?;
        dv.element_exists(config.control_value)?;
        dv.element_exists(config.feedback_value)?;

        let initial: bool = dv.read(config.control_value)?;
        fpga.configure_digital_out(config.pin, initial)
            .map_err(|_| Error::FpgaInit)?;

        Ok(Self { fpga, config })
    }
}

impl Device for DigitalOutDevice {
    fn run(&mut self, dv: &DataVector) -> Result<()> {
        let control: bool = dv.read(self.config.control_value)?;
        self.fpga
            .write_digital(self.config.pin, control)
            .map_err(|_| Error::FpgaWrite)?;

        let feedback = self
            .fpga
            .read_digital(self.config.pin)
            .map_err(|_| Error::FpgaRead)?;
        dv.write::<bool>(self.config.feedback_value, feedback)?;
        Ok(())
    }
}
