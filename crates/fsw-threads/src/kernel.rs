use std::fs;

use fsw_errors::{Error, Result};

use crate::sched::SW_IRQ;

/// The softirq kernel threads that must sit above application priority so
/// network and timer servicing is never starved (`spec.md` §4.3). PIDs are
/// not hard-coded, unlike the original source which assumed a fixed boot
/// order; they're discovered by name under `/proc` instead.
const KERNEL_THREAD_NAMES: [&str; 4] = ["ksoftirqd/0", "ksoftirqd/1", "ktimersoftd/0", "ktimersoftd/1"];

pub(crate) fn raise_kernel_thread_priorities() -> Result<()> {
    for name in KERNEL_THREAD_NAMES {
        let pid = find_pid_by_comm(name).ok_or_else(|| {
            tracing::error!(name, "kernel thread not found under /proc");
            Error::FailedToInitKernelEnv
        })?;
        set_priority_for_pid(pid, SW_IRQ)?;
    }
    Ok(())
}

fn find_pid_by_comm(name: &str) -> Option<i32> {
    let entries = fs::read_dir("/proc").ok()?;
    for entry in entries.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<i32>() else {
            continue;
        };
        if let Ok(comm) = fs::read_to_string(entry.path().join("comm")) {
            if comm.trim() == name {
                return Some(pid);
            }
        }
    }
    None
}

fn set_priority_for_pid(pid: i32, priority: i32) -> Result<()> {
    let param = libc::sched_param { sched_priority: priority };
    // SAFETY: `pid` was just discovered as a live kernel-thread pid under
    // `/proc`; `param` is a fully initialized `sched_param`.
    let rc = unsafe { libc::sched_setscheduler(pid, libc::SCHED_FIFO, &param) };
    if rc != 0 {
        tracing::error!(
            pid,
            priority,
            error = %std::io::Error::last_os_error(),
            "sched_setscheduler failed for kernel thread"
        );
        return Err(Error::FailedToInitKernelEnv);
    }
    Ok(())
}
