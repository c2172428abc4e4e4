//! Handoff from the interrupt side to the drawing task.

use core::sync::atomic::{AtomicBool, Ordering};

/// Something that can wake the drawing task when a new draw buffer is ready.
pub trait FrameRelease {
    fn release(&mut self);
}

/// Binary semaphore. Releases while nobody is waiting coalesce into one.
#[derive(Debug, Default)]
pub struct BinarySignal {
    raised: AtomicBool,
}

impl BinarySignal {
    pub const fn new() -> Self {
        BinarySignal {
            raised: AtomicBool::new(false),
        }
    }

    pub fn release(&self) {
        self.raised.store(true, Ordering::Release)
    }

    /// Consumes a pending release, if any.
    pub fn try_take(&self) -> bool {
        self.raised.swap(false, Ordering::Acquire)
    }

    /// Blocks until released or until `give_up`, polled between checks,
    /// returns true. Returns whether a release was consumed.
    pub fn wait(&self, mut give_up: impl FnMut() -> bool) -> bool {
        loop {
            if self.try_take() {
                return true;
            }
            if give_up() {
                return false;
            }
        }
    }
}

impl<'a> FrameRelease for &'a BinarySignal {
    fn release(&mut self) {
        BinarySignal::release(*self)
    }
}
