//! Try-lock cells for handing hardware between `main` and interrupt handlers.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

/// A `T` that at most one context can hold at a time.
///
/// Locking never waits: `try_lock` either succeeds or reports contention.
/// That is what an interrupt handler wants, since it can't wait for the code
/// it preempted. Thread code that really must get in can use `lock`, which
/// retries.
#[derive(Debug)]
pub struct SpinLock<T: ?Sized> {
    held: AtomicBool,
    value: UnsafeCell<T>,
}

unsafe impl<T: Send + ?Sized> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub const fn new(value: T) -> Self {
        SpinLock {
            held: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SpinLockError {
    Contended,
}

impl<T: ?Sized + Send> SpinLock<T> {
    pub fn try_lock(&self) -> Result<SpinLockGuard<T>, SpinLockError> {
        if self.held.swap(true, Ordering::Acquire) {
            return Err(SpinLockError::Contended);
        }
        // We made the false->true transition, so nobody else holds a
        // reference until the flag drops again.
        Ok(SpinLockGuard {
            flag: HeldFlag(&self.held),
            value: unsafe { &mut *self.value.get() },
        })
    }

    pub fn lock(&self) -> SpinLockGuard<T> {
        loop {
            if let Ok(guard) = self.try_lock() {
                return guard;
            }
        }
    }
}

#[must_use = "dropping the guard unlocks immediately"]
#[derive(Debug)]
pub struct SpinLockGuard<'a, T: ?Sized> {
    flag: HeldFlag<'a>,
    value: &'a mut T,
}

/// Clears the lock flag on drop. Kept apart from `SpinLockGuard` so `map`
/// can take the guard apart.
#[derive(Debug)]
struct HeldFlag<'a>(&'a AtomicBool);

impl<'a> Drop for HeldFlag<'a> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<'a, T: ?Sized> SpinLockGuard<'a, T> {
    /// Narrows a guard to part of its contents, keeping the lock held.
    pub fn map<U: ?Sized>(
        guard: SpinLockGuard<'a, T>,
        f: impl FnOnce(&mut T) -> &mut U,
    ) -> SpinLockGuard<'a, U> {
        let SpinLockGuard { flag, value } = guard;
        SpinLockGuard {
            flag,
            value: f(value),
        }
    }
}

impl<'a, T: ?Sized> core::ops::Deref for SpinLockGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.value
    }
}

impl<'a, T: ?Sized> core::ops::DerefMut for SpinLockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value
    }
}
