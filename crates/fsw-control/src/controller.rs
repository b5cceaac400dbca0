use fsw_datavector::{DataVector, ElementId};
use fsw_errors::Result;

use crate::mode::Mode;

/// A mode-gated per-tick work unit reading and writing the Data Vector
/// (`spec.md` §4.9).
///
/// A Controller is pure with respect to the Data Vector: inputs are read at
/// the start of `run_enabled`/`run_safed`, outputs written before it
/// returns. Any state that persists across ticks is the implementor's own
/// field, not something this trait manages.
pub trait Controller {
    /// The Data Vector element holding this controller's mode (`u8`,
    /// interpreted as [`Mode`]).
    fn mode_element(&self) -> ElementId;

    fn run_enabled(&mut self, dv: &DataVector) -> Result<()>;
    fn run_safed(&mut self, dv: &DataVector) -> Result<()>;

    /// Read the mode and dispatch to `run_enabled`/`run_safed`. An
    /// unrecognized mode value yields `InvalidEnum` without calling either.
    fn tick(&mut self, dv: &DataVector) -> Result<()> {
        let raw: u8 = dv.read(self.mode_element())?;
        match Mode::try_from(raw)? {
            Mode::Safed => self.run_safed(dv),
            Mode::Enabled => self.run_enabled(dv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsw_datavector::{DvConfig, ElementConfig, RegionConfig, RegionId, TypedValue};

    struct Counter {
        mode_elem: ElementId,
        enabled_runs: u32,
        safed_runs: u32,
    }

    impl Controller for Counter {
        fn mode_element(&self) -> ElementId {
            self.mode_elem
        }

        fn run_enabled(&mut self, _dv: &DataVector) -> Result<()> {
            self.enabled_runs += 1;
            Ok(())
        }

        fn run_safed(&mut self, _dv: &DataVector) -> Result<()> {
            self.safed_runs += 1;
            Ok(())
        }
    }

    #[test]
    fn dispatches_by_mode() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        let mut controller = Counter { mode_elem: ElementId(0), enabled_runs: 0, safed_runs: 0 };

        controller.tick(&dv).unwrap();
        assert_eq!(controller.safed_runs, 1);

        dv.write::<u8>(ElementId(0), 1).unwrap();
        controller.tick(&dv).unwrap();
        assert_eq!(controller.enabled_runs, 1);
    }

    #[test]
    fn unknown_mode_is_invalid_enum() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(9))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        let mut controller = Counter { mode_elem: ElementId(0), enabled_runs: 0, safed_runs: 0 };
        assert_eq!(controller.tick(&dv).unwrap_err(), fsw_errors::Error::InvalidEnum);
    }
}
