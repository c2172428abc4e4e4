//! NVIC control over sets of interrupts, and the cycle counter.
//!
//! Each operation writes the NVIC set/clear registers for every interrupt in
//! the set, then issues `dmb; isb` once, so the change has reached the core
//! when the call returns. `cortex_m`'s own NVIC methods don't wait.

use cortex_m::interrupt::Nr;
use cortex_m::peripheral::{DCB, DWT, NVIC};

/// Word and bit of `i` in the NVIC's banked registers.
fn slot<I: Nr>(i: &I) -> (usize, u32) {
    let n = i.nr();
    (usize::from(n / 32), 1 << (n % 32))
}

fn settle() {
    cortex_m::asm::dmb();
    cortex_m::asm::isb();
}

/// Enables `irqs`. Any that were pending have had their chance to run by
/// the time this returns.
pub fn enable_irqs<I: Nr>(nvic: &mut NVIC, irqs: &[I]) {
    for i in irqs {
        let (word, bit) = slot(i);
        // Safety: ISER is write-one-to-set; other bits are unaffected.
        unsafe { nvic.iser[word].write(bit) }
    }
    settle();
}

/// Disables `irqs`. None of them can preempt the caller after this returns.
pub fn disable_irqs<I: Nr>(nvic: &mut NVIC, irqs: &[I]) {
    for i in irqs {
        let (word, bit) = slot(i);
        // Safety: ICER is write-one-to-clear.
        unsafe { nvic.icer[word].write(bit) }
    }
    settle();
}

/// Unpends `irqs`. A source that is still asserting pends again.
pub fn clear_pending_irqs<I: Nr>(nvic: &mut NVIC, irqs: &[I]) {
    for i in irqs {
        let (word, bit) = slot(i);
        // Safety: ICPR is write-one-to-clear.
        unsafe { nvic.icpr[word].write(bit) }
    }
    settle();
}

/// Free-running microsecond clock derived from the DWT cycle counter.
///
/// Wraps every 2^32 cycles (about 25s at 168MHz), which is fine for
/// measuring the gap between consecutive vertical syncs as long as callers
/// use `wrapping_sub`.
pub struct CycleClock {
    cycles_per_us: u32,
    last_cycles: u32,
    micros: u32,
    remainder: u32,
}

impl CycleClock {
    pub fn start(dcb: &mut DCB, dwt: &mut DWT, cpu_hz: u32) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();
        CycleClock {
            cycles_per_us: cpu_hz / 1_000_000,
            last_cycles: DWT::get_cycle_count(),
            micros: 0,
            remainder: 0,
        }
    }

    /// Current time in microseconds. Must be called at least once per
    /// counter wrap to stay accurate; one call per field is plenty.
    pub fn now_us(&mut self) -> u32 {
        let now = DWT::get_cycle_count();
        let elapsed = now.wrapping_sub(self.last_cycles).wrapping_add(self.remainder);
        self.last_cycles = now;
        self.micros = self.micros.wrapping_add(elapsed / self.cycles_per_us);
        self.remainder = elapsed % self.cycles_per_us;
        self.micros
    }
}
