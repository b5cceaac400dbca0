use std::thread::JoinHandle;
use std::time::Duration;

use fsw_errors::{Error, Result};

use crate::sched::{self, APP_PRIORITY_MAX, APP_PRIORITY_MIN};
use crate::timer::PeriodicTimer;

pub use crate::sched::Affinity;

/// Process-wide real-time environment setup and the thread / periodic-
/// thread factories described in `spec.md` §4.3.
///
/// Redesign note: the original factory takes a raw `(fn, args_ptr,
/// args_len)` triple and copies the arguments to the heap itself, because
/// its thread entry point has a C `void*` signature. A Rust closure already
/// owns everything it captures, so `create_thread`/`create_periodic_thread`
/// take a closure directly — the heap-copy-and-free-on-join bookkeeping the
/// original needs has no counterpart here.
pub struct ThreadManager;

impl ThreadManager {
    /// Perform the once-per-process real-time initialization: lock memory,
    /// raise the calling thread to `FSW_INIT` priority pinned to core 0,
    /// and raise the kernel softirq threads to `SW_IRQ`.
    pub fn init() -> Result<Self> {
        sched::lock_memory()?;
        sched::set_scheduler_fifo(sched::FSW_INIT)?;
        sched::set_affinity(Affinity::Core0)?;
        crate::kernel::raise_kernel_thread_priorities()?;
        Ok(Self)
    }

    /// Spawn a `SCHED_FIFO` thread at `priority` (must lie in `[2, 12]`)
    /// pinned to `affinity`, running `body` once.
    pub fn create_thread<F, T>(&self, priority: i32, affinity: Affinity, body: F) -> Result<JoinHandle<Result<T>>>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        if !(APP_PRIORITY_MIN..=APP_PRIORITY_MAX).contains(&priority) {
            return Err(Error::InvalidPriority);
        }
        std::thread::Builder::new()
            .spawn(move || {
                sched::set_scheduler_fifo(priority)?;
                sched::set_affinity(affinity)?;
                body()
            })
            .map_err(|err| {
                tracing::error!(%err, "failed to spawn thread");
                Error::FailedToCreateThread
            })
    }

    /// Spawn a `SCHED_FIFO` thread at `priority`/`affinity` that runs `body`
    /// once every `period`, timed by an interval timerfd. If the timer
    /// reports more than one expiration since the last read, or `body`
    /// returns an error, `error_handler` is invoked with the error; it may
    /// swallow it (`Ok(())`, the loop continues) or return an error (the
    /// thread exits with it). Timer-subsystem failures are always fatal.
    pub fn create_periodic_thread<F, H>(
        &self,
        priority: i32,
        affinity: Affinity,
        period: Duration,
        mut body: F,
        mut error_handler: H,
    ) -> Result<JoinHandle<Result<()>>>
    where
        F: FnMut() -> Result<()> + Send + 'static,
        H: FnMut(Error) -> Result<()> + Send + 'static,
    {
        if !(APP_PRIORITY_MIN..=APP_PRIORITY_MAX).contains(&priority) {
            return Err(Error::InvalidPriority);
        }
        std::thread::Builder::new()
            .spawn(move || -> Result<()> {
                sched::set_scheduler_fifo(priority)?;
                sched::set_affinity(affinity)?;
                let timer = PeriodicTimer::new(period)?;
                loop {
                    let expirations = timer.wait_for_tick()?;
                    if expirations > 1 {
                        tracing::warn!(expirations, "periodic thread missed its deadline");
                        error_handler(Error::MissedSchedulerDeadline)?;
                    }
                    if let Err(err) = body() {
                        error_handler(err)?;
                    }
                }
            })
            .map_err(|err| {
                tracing::error!(%err, "failed to spawn periodic thread");
                Error::FailedToCreateThread
            })
    }

    /// Join a thread handle created by this manager, propagating either its
    /// panic (mapped to `FailedToWaitOnThread`) or its returned error.
    pub fn wait_for_thread<T>(&self, handle: JoinHandle<Result<T>>) -> Result<T> {
        handle.join().map_err(|_| Error::FailedToWaitOnThread)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_thread_rejects_out_of_range_priority() {
        // No process-wide `init()` is needed to exercise validation, which
        // happens before any scheduling syscall.
        let manager = ThreadManager;
        let err = manager.create_thread(0, Affinity::Core0, || Ok(())).unwrap_err();
        assert_eq!(err, Error::InvalidPriority);
        let err = manager.create_thread(13, Affinity::Core0, || Ok(())).unwrap_err();
        assert_eq!(err, Error::InvalidPriority);
    }
}
