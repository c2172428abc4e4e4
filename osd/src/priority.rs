//! Type-level representation of execution contexts.
//!
//! The tokens are zero-sized. Interrupt handlers conjure an `Isr` token and
//! the drawing task gets a `Thread` token; APIs that are only sound from one
//! side demand the matching token, so the buffer roles can't be mixed up.

use core::marker::PhantomData;

// Marker type used to cause things to stop being Sync/Send.
type NotSyncOrSend = PhantomData<*mut ()>;

/// Sync-edge and transfer-complete interrupts. These all run at one priority
/// and never preempt each other.
#[derive(Copy, Clone)]
pub struct Isr(NotSyncOrSend);

/// Thread mode execution occurs outside any interrupt handler.
#[derive(Copy, Clone)]
pub struct Thread(NotSyncOrSend);

impl Isr {
    /// # Safety
    ///
    /// The caller must be running in one of the overlay interrupt handlers,
    /// or be a simulation that never runs thread code concurrently with it.
    pub unsafe fn new() -> Self {
        Isr(PhantomData)
    }
}

impl Thread {
    /// # Safety
    ///
    /// The caller must not be running in an interrupt handler.
    pub unsafe fn new() -> Self {
        Thread(PhantomData)
    }
}

#[cfg(target_os = "none")]
impl Thread {
    /// Returns a `Thread` token only if called from thread priority.
    pub fn new_checked() -> Option<Self> {
        // Safety: reads of the ICSR are safe.
        let icsr = unsafe { &(*cortex_m::peripheral::SCB::ptr()).icsr }.read();
        if icsr & 0xFF == 0 {
            Some(unsafe { Self::new() })
        } else {
            None
        }
    }
}

#[cfg(not(target_os = "none"))]
impl Thread {
    /// Hosted builds have no interrupts, so everything is thread mode.
    pub fn new_checked() -> Option<Self> {
        Some(unsafe { Self::new() })
    }
}

/// Indicates that a type represents an interrupt priority level.
pub trait InterruptPriority {}

impl InterruptPriority for Isr {}
