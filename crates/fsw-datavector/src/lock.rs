use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use fsw_errors::{Error, Result};

/// Sentinel meaning "no thread currently holds the lock".
const UNLOCKED: u64 = 0;

fn current_thread_tag() -> u64 {
    // Same idiom the teacher uses to turn a `TypeId` into a stable `u64`
    // (`ComponentTypeId::of`): hash the opaque id with `DefaultHasher`. A
    // collision with `UNLOCKED` is astronomically unlikely and would only
    // ever cause a spurious same-thread-relock rejection, never a missed one.
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    (hasher.finish()) | 1
}

/// An error-checking, non-reentrant mutex guarding the Data Vector's backing
/// buffer.
///
/// `std::sync::Mutex` already blocks concurrent access from other threads;
/// what it does not give us is the original's error-checking semantics —
/// a thread that locks twice must get an error back, not deadlock. This
/// wrapper tracks the owning thread in an `AtomicU64` and refuses a
/// same-thread relock before ever calling into the underlying mutex.
#[derive(Debug)]
pub struct DvLock {
    buf: Mutex<Vec<u8>>,
    owner: AtomicU64,
}

impl DvLock {
    pub fn new(initial: Vec<u8>) -> Self {
        Self { buf: Mutex::new(initial), owner: AtomicU64::new(UNLOCKED) }
    }

    /// Acquire the lock, blocking until available.
    ///
    /// Returns [`Error::FailedToLock`] immediately, without blocking, if
    /// the calling thread already holds the lock.
    pub fn lock(&self) -> Result<DvGuard<'_>> {
        let me = current_thread_tag();
        if self.owner.load(Ordering::Acquire) == me {
            tracing::error!("Data Vector lock re-entered by its own owning thread");
            return Err(Error::FailedToLock);
        }
        let guard = self.buf.lock().map_err(|_| Error::FailedToLock)?;
        self.owner.store(me, Ordering::Release);
        Ok(DvGuard { guard: Some(guard), owner: &self.owner })
    }
}

/// An RAII guard over the Data Vector's buffer.
///
/// This is the Rust expression of the original's explicit
/// `acquireLock()`/`releaseLock()` pair: a caller that needs to hold the
/// lock across more than one operation (the network TX path copying a
/// region out and then sending it) keeps this guard alive across both
/// steps instead of calling acquire/release by hand. Dropping the guard is
/// the release.
pub struct DvGuard<'a> {
    guard: Option<std::sync::MutexGuard<'a, Vec<u8>>>,
    owner: &'a AtomicU64,
}

impl Deref for DvGuard<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        self.guard.as_ref().expect("guard taken before drop")
    }
}

impl DerefMut for DvGuard<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        self.guard.as_mut().expect("guard taken before drop")
    }
}

impl Drop for DvGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.owner.store(UNLOCKED, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relock_by_same_thread_is_rejected() {
        let lock = DvLock::new(vec![0u8; 4]);
        let _first = lock.lock().expect("first lock");
        assert_eq!(lock.lock().unwrap_err(), Error::FailedToLock);
    }

    #[test]
    fn lock_is_reusable_after_drop() {
        let lock = DvLock::new(vec![0u8; 4]);
        {
            let _g = lock.lock().expect("first lock");
        }
        assert!(lock.lock().is_ok());
    }

    #[test]
    fn another_thread_can_lock_after_release() {
        let lock = std::sync::Arc::new(DvLock::new(vec![0u8; 4]));
        let first = lock.lock().expect("first lock");
        drop(first);
        let lock2 = lock.clone();
        let handle = std::thread::spawn(move || lock2.lock().is_ok());
        assert!(handle.join().unwrap());
    }
}
