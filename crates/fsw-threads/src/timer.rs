use std::os::fd::AsRawFd;
use std::time::Duration;

use fsw_errors::{Error, Result};
use nix::sys::time::TimeSpec;
use nix::sys::timerfd::{ClockId, Expiration, TimerFd, TimerFlags, TimerSetTimeFlags};
use nix::unistd::read;

/// An interval timerfd, read once per period by a periodic thread to stay
/// drift-free and to detect a missed deadline (`spec.md` §4.3, §5).
pub(crate) struct PeriodicTimer {
    fd: TimerFd,
}

impl PeriodicTimer {
    pub fn new(period: Duration) -> Result<Self> {
        let fd = TimerFd::new(ClockId::CLOCK_MONOTONIC, TimerFlags::empty()).map_err(|errno| {
            tracing::error!(%errno, "timerfd_create failed");
            Error::FailedToCreateTimerfd
        })?;
        let interval = TimeSpec::new(period.as_secs() as i64, i64::from(period.subsec_nanos()));
        fd.set(Expiration::IntervalDelay(interval), TimerSetTimeFlags::empty()).map_err(|errno| {
            tracing::error!(%errno, "timerfd_settime failed");
            Error::FailedToArmTimerfd
        })?;
        Ok(Self { fd })
    }

    /// Block until the next period boundary. Returns the number of
    /// expirations that elapsed since the last read — `1` in the common
    /// case, `>1` means the previous period's body ran past the next
    /// boundary (a deadline miss).
    pub fn wait_for_tick(&self) -> Result<u64> {
        let mut buf = [0u8; 8];
        let n = read(self.fd.as_raw_fd(), &mut buf).map_err(|errno| {
            tracing::error!(%errno, "read(timerfd) failed");
            Error::FailedToReadTimerfd
        })?;
        if n != 8 {
            return Err(Error::FailedToReadTimerfd);
        }
        Ok(u64::from_ne_bytes(buf))
    }
}
