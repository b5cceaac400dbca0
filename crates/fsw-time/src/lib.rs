//! Process-wide monotonic time source.
//!
//! A single `Clock` is created once per process (by the node assembly code
//! in `fsw-node`) and handed to every consumer that needs `now_ns()`; there
//! is no free-standing global clock. This mirrors the "no mutable
//! singletons" redesign applied across the workspace: the original `Time`
//! module is a static/singleton in the C++ source, here it is an explicit
//! value.

use fsw_errors::{Error, Result};
use nix::sys::time::TimeSpec;
use nix::time::{ClockId, clock_gettime};

/// One year, in whole seconds, used as the safety margin against the
/// monotonic clock's 32-bit-seconds overflow horizon.
const ONE_YEAR_SECS: i64 = 365 * 24 * 60 * 60;

/// A captured monotonic origin. `now_ns()` returns nanoseconds elapsed
/// since the instant this `Clock` was created.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    init: TimeSpec,
}

impl Clock {
    /// Capture the current monotonic instant as this clock's origin.
    ///
    /// Fails with [`Error::FailedToGetTime`] if the OS clock read fails, or
    /// [`Error::OverflowImminent`] if the clock's raw seconds value is
    /// within one year of overflowing a 32-bit count — the same refusal the
    /// original flight software performs at startup.
    pub fn new() -> Result<Self> {
        let init = read_monotonic()?;
        check_overflow_horizon(init)?;
        Ok(Self { init })
    }

    /// Nanoseconds elapsed since this clock's origin.
    pub fn now_ns(&self) -> Result<u64> {
        let now = read_monotonic()?;
        let delta = now - self.init;
        let nanos = delta.tv_sec() * 1_000_000_000 + i64::from(delta.tv_nsec());
        Ok(nanos.max(0) as u64)
    }

    /// The captured origin, for diagnostics and tests.
    pub fn origin(&self) -> TimeSpec {
        self.init
    }
}

fn read_monotonic() -> Result<TimeSpec> {
    clock_gettime(ClockId::CLOCK_MONOTONIC).map_err(|errno| {
        tracing::error!(%errno, "clock_gettime(CLOCK_MONOTONIC) failed");
        Error::FailedToGetTime
    })
}

fn check_overflow_horizon(ts: TimeSpec) -> Result<()> {
    if ts.tv_sec() > i64::from(u32::MAX) - ONE_YEAR_SECS {
        tracing::error!(tv_sec = ts.tv_sec(), "clock is within one year of 32-bit overflow");
        return Err(Error::OverflowImminent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ns_is_nondecreasing() {
        let clock = Clock::new().expect("clock init");
        let a = clock.now_ns().expect("read a");
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = clock.now_ns().expect("read b");
        assert!(b >= a);
    }

    #[test]
    fn now_ns_starts_near_zero() {
        let clock = Clock::new().expect("clock init");
        let t = clock.now_ns().expect("read t");
        assert!(t < 1_000_000_000, "expected sub-second elapsed right after init, got {t}");
    }
}
