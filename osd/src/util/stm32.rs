//! Clock bring-up for the STM32F407.

use stm32f4::stm32f407 as device;

use device::flash::acr::LATENCYW;
use device::rcc::cfgr::{HPREW, PPRE1W, PPRE2W, SWSR, SWW};
use device::rcc::pllcfgr::{PLLPW, PLLSRCW};

/// CPU clock produced by `configure_clocks_168mhz`.
pub const CPU_HZ: u32 = 168_000_000;

/// Kernel clock of the APB1 timers (TIM2-7, TIM12-14). APB1 is divided, so
/// its timers run at twice the bus clock.
pub const APB1_TIMER_HZ: u32 = 84_000_000;

macro_rules! block_until {
    ($condition:expr) => {
        while !$condition {}
    };
}

/// Runs the core at 168MHz from an 8MHz crystal, with APB2 at 84MHz and APB1
/// at 42MHz.
///
/// Passes through the internal oscillator, so this is safe to call whatever
/// the current clock setup.
pub fn configure_clocks_168mhz(rcc: &device::RCC, flash: &device::FLASH) {
    rcc.cr.modify(|_, w| w.hsion().set_bit());
    block_until! { rcc.cr.read().hsirdy().bit() }
    rcc.cfgr.modify(|_, w| w.sw().variant(SWW::HSI));
    block_until! { rcc.cfgr.read().sws() == SWSR::HSI }

    rcc.cr.modify(|_, w| w.pllon().clear_bit());
    block_until! { !rcc.cr.read().pllrdy().bit() }

    // Divisors and wait states go in before the clock goes up.
    rcc.cfgr.modify(|_, w| {
        w.hpre()
            .variant(HPREW::DIV1)
            .ppre1()
            .variant(PPRE1W::DIV4)
            .ppre2()
            .variant(PPRE2W::DIV2)
    });
    flash.acr.modify(|_, w| w.latency().variant(LATENCYW::WS5));

    rcc.cr.modify(|_, w| w.hseon().set_bit());
    block_until! { rcc.cr.read().hserdy().bit() }

    // 8MHz / 8 * 336 / 2 = 168MHz; / 7 = 48MHz for USB.
    rcc.pllcfgr.modify(|_, w| {
        // Safety: these fields take any value in range; the svd marks them
        // unsafe anyway.
        unsafe {
            w.pllm().bits(8);
            w.plln().bits(336);
            w.pllq().bits(7);
        }
        w.pllp().variant(PLLPW::DIV2).pllsrc().variant(PLLSRCW::HSE)
    });
    rcc.cr.modify(|_, w| w.pllon().set_bit());
    block_until! { rcc.cr.read().pllrdy().bit() }

    rcc.cfgr.modify(|_, w| w.sw().variant(SWW::PLL));
    block_until! { rcc.cfgr.read().sws() == SWSR::PLL }
}
