use fsw_errors::{Error, Result};
use nix::sched::{CpuSet, sched_setaffinity};
use nix::sys::mman::{MlockAllFlags, mlockall};
use nix::unistd::Pid;

/// Priority the process is raised to during [`crate::ThreadManager::init`],
/// before any application thread is spawned.
pub const FSW_INIT: i32 = 13;
/// Priority the kernel softirq threads are raised to at init, so they keep
/// preempting application threads (`spec.md` §5 priority ladder).
pub const SW_IRQ: i32 = 14;
/// Fixed hardware-IRQ priority; never set by this crate, listed for
/// reference against the priority ladder in `spec.md` §5.
pub const HW_IRQ: i32 = 15;
/// Lowest priority an application (non-init) thread may request.
pub const APP_PRIORITY_MIN: i32 = 2;
/// Highest priority an application (non-init) thread may request.
pub const APP_PRIORITY_MAX: i32 = 12;

/// CPU affinity a thread may be pinned to. This deployment target has two
/// application cores; core assignment beyond `Both` is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Core0,
    Core1,
    Both,
}

pub(crate) fn lock_memory() -> Result<()> {
    mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE).map_err(|errno| {
        tracing::error!(%errno, "mlockall failed");
        Error::FailedToInitKernelEnv
    })
}

pub(crate) fn set_affinity(affinity: Affinity) -> Result<()> {
    let mut set = CpuSet::new();
    let cores: &[usize] = match affinity {
        Affinity::Core0 => &[0],
        Affinity::Core1 => &[1],
        Affinity::Both => &[0, 1],
    };
    for &core in cores {
        set.set(core).map_err(|errno| {
            tracing::error!(%errno, core, "CpuSet::set failed");
            Error::InvalidAffinity
        })?;
    }
    // Pid 0 addresses the calling thread, per sched_setaffinity(2).
    sched_setaffinity(Pid::from_raw(0), &set).map_err(|errno| {
        tracing::error!(%errno, "sched_setaffinity failed");
        Error::InvalidAffinity
    })
}

/// Set the calling thread to `SCHED_FIFO` at `priority`.
pub(crate) fn set_scheduler_fifo(priority: i32) -> Result<()> {
    let param = libc::sched_param { sched_priority: priority };
    // SAFETY: pid 0 addresses the calling thread; `param` is a fully
    // initialized `sched_param`.
    let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if rc != 0 {
        tracing::error!(
            priority,
            error = %std::io::Error::last_os_error(),
            "sched_setscheduler failed"
        );
        return Err(Error::FailedToInitKernelEnv);
    }
    Ok(())
}
