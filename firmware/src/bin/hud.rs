//! Flight HUD overlay.
//!
//! On the board this runs the overlay driver and redraws the HUD from
//! synthetic telemetry. On the host it runs the same HUD through the
//! simulated controller and prints the result:
//!
//! ```text
//! cargo run --bin hud -- pal
//! ```

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(all(target_os = "none", feature = "panic-halt"))]
extern crate panic_halt;
#[cfg(all(target_os = "none", feature = "panic-itm"))]
extern crate panic_itm;
#[cfg(all(target_os = "none", feature = "defmt"))]
use defmt_rtt as _;

/// RTT logging takes a critical section; on one core masking interrupts is
/// enough.
#[cfg(all(target_os = "none", feature = "defmt"))]
mod single_core {
    use cortex_m::register::primask;

    struct SingleCore;
    critical_section::set_impl!(SingleCore);

    unsafe impl critical_section::Impl for SingleCore {
        unsafe fn acquire() -> critical_section::RawRestoreState {
            let was_enabled = primask::read().is_inactive();
            cortex_m::interrupt::disable();
            was_enabled
        }

        unsafe fn release(was_enabled: critical_section::RawRestoreState) {
            if was_enabled {
                cortex_m::interrupt::enable();
            }
        }
    }
}

use osd::OsdConfig;
use osd_firmware::hud::{Hud, Telemetry};

#[cfg(target_os = "none")]
use stm32f4::stm32f407::interrupt;

/// Half a second at 168MHz: how long to ignore the signal after a sync fault.
#[cfg(target_os = "none")]
const FAULT_BACKOFF_CYCLES: u32 = 168_000_000 / 2;

/// Firmware entry point. Starts the overlay and redraws the HUD on every
/// released frame.
#[cfg(target_os = "none")]
#[cortex_m_rt::entry]
fn main() -> ! {
    let mut osd = osd::take_hardware(OsdConfig::default()).unwrap();
    let thread = osd::priority::Thread::new_checked().unwrap();

    let mut frame = 0;
    loop {
        let drawn = osd.draw_frame(&thread, |canvas, standard| {
            Hud::new(standard.timing().bounds).draw(canvas, &Telemetry::demo(frame));
        });
        match drawn {
            Some(()) => frame += 1,
            None => {
                // Noisy sync; give the signal a moment to settle.
                cortex_m::asm::delay(FAULT_BACKOFF_CYCLES);
                osd.re_enable();
            }
        }
    }
}

/// Vertical sync, PC4.
#[cfg(target_os = "none")]
#[interrupt]
fn EXTI4() {
    osd::vsync_isr()
}

/// Horizontal sync, PC5.
#[cfg(target_os = "none")]
#[interrupt]
fn EXTI9_5() {
    osd::hsync_isr()
}

/// Mask plane transfer complete.
#[cfg(target_os = "none")]
#[interrupt]
fn DMA2_STREAM5() {
    osd::transfer_isr()
}

/// Line start, once the back porch has passed.
#[cfg(target_os = "none")]
#[interrupt]
fn TIM2() {
    osd::line_start_isr()
}

#[cfg(not(target_os = "none"))]
fn main() -> Result<(), osd::ConfigError> {
    let lines = match std::env::args().nth(1).as_ref().map(String::as_str) {
        Some("pal") => 312,
        _ => 262,
    };
    let report = osd_firmware::sim::run(OsdConfig::default(), lines, 8, |canvas, standard, field| {
        Hud::new(standard.timing().bounds).draw(canvas, &Telemetry::demo(field));
    })?;

    print!("{}", report.screen);
    println!(
        "{:?}: {} fields, {} redraws, {} overruns, {} dropped lines",
        report.standard, report.frames, report.redraws, report.overruns, report.dropped_lines
    );
    Ok(())
}
