//! Ping-pong pair of framebuffers shared by scanout and drawing.
//!
//! One slot is being *displayed* (streamed out by interrupt handlers) while
//! the other is the *draw* slot (painted by the drawing task). The roles only
//! change through `DisplaySide::try_swap`, which refuses while the drawing
//! task holds its lease, so the buffer being painted is never on screen.
//!
//! # Use of priority tokens
//!
//! - The display buffer can only be *read*, and only from interrupt handlers.
//! - The draw buffer can only be *written*, and only from thread mode.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use osd_gfx::FrameBuffer;

use crate::priority;

/// Index of the display slot.
const DISPLAY: usize = 0b01;
/// Set while the drawing task holds the draw slot.
const LEASE: usize = 0b10;

pub struct BufferPair {
    slots: [UnsafeCell<FrameBuffer>; 2],
    state: AtomicUsize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwapError {
    /// The drawing task still holds the draw buffer.
    DrawInProgress,
}

impl BufferPair {
    /// Creates a pair of cleared buffers. Slot 0 is displayed first.
    pub const fn new() -> Self {
        BufferPair {
            slots: [
                UnsafeCell::new(FrameBuffer::new()),
                UnsafeCell::new(FrameBuffer::new()),
            ],
            state: AtomicUsize::new(0),
        }
    }

    /// Generates the interrupt-side and thread-side handles for this pair.
    pub fn split(&mut self) -> (DisplaySide, DrawSide) {
        (
            DisplaySide {
                // Safety: this is an &mut, it cannot be null
                pair: unsafe { NonNull::new_unchecked(self) },
                _life: PhantomData,
            },
            DrawSide {
                // Safety: this is an &mut, it cannot be null
                pair: unsafe { NonNull::new_unchecked(self) },
                _life: PhantomData,
            },
        )
    }
}

impl Default for BufferPair {
    fn default() -> Self {
        Self::new()
    }
}

/// Scanout's view of a `BufferPair`.
pub struct DisplaySide<'a> {
    pair: NonNull<BufferPair>,
    _life: PhantomData<&'a ()>,
}

unsafe impl<'a> Send for DisplaySide<'a> {}

impl<'a> DisplaySide<'a> {
    fn pair(&self) -> &BufferPair {
        unsafe { self.pair.as_ref() }
    }

    pub fn display_index(&self) -> usize {
        self.pair().state.load(Ordering::Acquire) & DISPLAY
    }

    /// Gets the buffer currently being displayed.
    ///
    /// The caller is required to provide an interrupt priority token `P`,
    /// which keeps the reference from outliving the handler that streams
    /// from it.
    pub fn display<'r, P>(&'r self, _: &'r P) -> &'r FrameBuffer
    where
        P: priority::InterruptPriority,
    {
        let pair = self.pair();
        let i = pair.state.load(Ordering::Acquire) & DISPLAY;
        // Safety: the draw side only hands out the other slot, and the
        // display slot can only change through `try_swap`, which needs
        // `&mut self`.
        unsafe { &*pair.slots[i].get() }
    }

    /// Exchanges the roles of the two buffers, returning the index of the
    /// new display slot.
    pub fn try_swap(&mut self) -> Result<usize, SwapError> {
        let state = &self.pair().state;
        let current = state.load(Ordering::Acquire);
        if current & LEASE != 0 {
            return Err(SwapError::DrawInProgress);
        }
        let next = current ^ DISPLAY;
        state
            .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| next & DISPLAY)
            // The lease was taken between our load and the exchange.
            .map_err(|_| SwapError::DrawInProgress)
    }
}

/// The drawing task's view of a `BufferPair`.
pub struct DrawSide<'a> {
    pair: NonNull<BufferPair>,
    _life: PhantomData<&'a ()>,
}

impl<'a> DrawSide<'a> {
    /// Takes the draw buffer. Until the returned guard is dropped the buffers
    /// can't swap.
    ///
    /// The caller is required to provide a `Thread` priority token, showing
    /// that it cannot be preempted by itself from an interrupt handler.
    pub fn lock(&mut self, _: &priority::Thread) -> DrawGuard {
        // Safety: only the display side touches the other slot, and it
        // doesn't write.
        let pair = unsafe { self.pair.as_ref() };
        let previous = pair.state.fetch_or(LEASE, Ordering::AcqRel);
        let index = (previous & DISPLAY) ^ 1;
        DrawGuard {
            state: &pair.state,
            index,
            fb: unsafe { &mut *pair.slots[index].get() },
            _not_sync_send: PhantomData,
        }
    }
}

/// Exclusive access to the draw buffer; releases the lease when dropped.
pub struct DrawGuard<'a> {
    state: &'a AtomicUsize,
    index: usize,
    fb: &'a mut FrameBuffer,
    _not_sync_send: PhantomData<*mut ()>,
}

impl<'a> DrawGuard<'a> {
    /// Which slot of the pair is being drawn.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<'a> Drop for DrawGuard<'a> {
    fn drop(&mut self) {
        self.state.fetch_and(!LEASE, Ordering::Release);
    }
}

impl<'a> core::ops::Deref for DrawGuard<'a> {
    type Target = FrameBuffer;
    fn deref(&self) -> &Self::Target {
        self.fb
    }
}

impl<'a> core::ops::DerefMut for DrawGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.fb
    }
}
