//! Timing probes on spare GPIOs, for watching the interrupt handlers on a
//! logic analyzer. Everything here compiles to nothing unless the
//! `measurement` feature is on and we're building for the target.
//!
//! This ignores hardware ownership entirely: if the board uses PC8-PC11 for
//! anything else, don't enable the feature.
//!
//! Probes are high while the corresponding code runs:
//!
//! - `VerticalSync`: PC8
//! - `HorizontalSync`: PC9
//! - `Transfer`: PC10
//! - `Drawing`: PC11

use scopeguard::ScopeGuard;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Probe {
    VerticalSync,
    HorizontalSync,
    Transfer,
    Drawing,
}

impl Probe {
    /// Pin number on GPIOC.
    pub fn pin(self) -> u8 {
        match self {
            Probe::VerticalSync => 8,
            Probe::HorizontalSync => 9,
            Probe::Transfer => 10,
            Probe::Drawing => 11,
        }
    }
}

/// Powers GPIOC and makes the probe pins fast push-pull outputs.
///
/// # Safety
///
/// Read-modify-writes RCC and GPIOC without locking. Call it early in `main`,
/// before any interrupt that touches those is enabled.
pub unsafe fn init() {
    #[cfg(all(feature = "measurement", target_os = "none"))]
    {
        use stm32f4::stm32f407 as device;
        let rcc = &*device::RCC::ptr();
        let gpioc = &*device::GPIOC::ptr();

        rcc.ahb1enr.modify(|_, w| w.gpiocen().set_bit());
        gpioc.ospeedr.modify(|_, w| {
            w.ospeedr8()
                .very_high_speed()
                .ospeedr9()
                .very_high_speed()
                .ospeedr10()
                .very_high_speed()
                .ospeedr11()
                .very_high_speed()
        });
        gpioc.moder.modify(|_, w| {
            w.moder8()
                .output()
                .moder9()
                .output()
                .moder10()
                .output()
                .moder11()
                .output()
        });
    }
}

/// Drives `probe` high.
#[allow(unused_variables)]
pub fn set(probe: Probe) {
    #[cfg(all(target_os = "none", feature = "measurement"))]
    write_bsrr(1 << probe.pin());
}

/// Drives `probe` low.
#[allow(unused_variables)]
pub fn clear(probe: Probe) {
    #[cfg(all(target_os = "none", feature = "measurement"))]
    write_bsrr(1 << (probe.pin() + 16));
}

/// Holds `probe` high until the returned guard is dropped.
pub fn span(probe: Probe) -> ScopeGuard<Probe, fn(Probe)> {
    set(probe);
    scopeguard::guard(probe, clear as fn(Probe))
}

#[cfg(all(target_os = "none", feature = "measurement"))]
fn write_bsrr(bits: u32) {
    use stm32f4::stm32f407 as device;
    // Safety: BSRR writes are atomic and only touch the named pins.
    unsafe { (*device::GPIOC::ptr()).bsrr.write(|w| w.bits(bits)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_use_distinct_pins() {
        let pins = [
            Probe::VerticalSync.pin(),
            Probe::HorizontalSync.pin(),
            Probe::Transfer.pin(),
            Probe::Drawing.pin(),
        ];
        assert_eq!(pins, [8, 9, 10, 11]);
    }

    #[test]
    fn span_hands_back_its_probe() {
        let g = span(Probe::Drawing);
        assert_eq!(*g, Probe::Drawing);
    }
}
