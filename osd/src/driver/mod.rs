//! Hardware driver for the STM32F407.
//!
//! Pin and peripheral assignments:
//!
//! - PC4 (EXTI4): vertical sync from the sync separator, falling edge.
//! - PC5 (EXTI9_5): horizontal sync, falling edge.
//! - PA7 (SPI1 MOSI, DMA2 stream 5): mask plane.
//! - PB15 (SPI2 MOSI, DMA1 stream 4): level plane.
//! - TIM2: times the start of each line from its horizontal sync.
//!
//! Four interrupts must be wired to the handlers here:
//!
//! ```
//! use stm32f4::stm32f407::interrupt;
//!
//! #[interrupt]
//! fn EXTI4() {
//!     osd::vsync_isr()
//! }
//!
//! #[interrupt]
//! fn EXTI9_5() {
//!     osd::hsync_isr()
//! }
//!
//! #[interrupt]
//! fn DMA2_STREAM5() {
//!     osd::transfer_isr()
//! }
//!
//! #[interrupt]
//! fn TIM2() {
//!     osd::line_start_isr()
//! }
//! ```

mod spi_dma;

use core::sync::atomic::{AtomicBool, Ordering};

use stm32f4::stm32f407 as device;

use cortex_m::peripheral as cm;
use osd_gfx::Canvas;

use crate::buffers::{BufferPair, DrawSide};
use crate::config::{ConfigError, OsdConfig};
use crate::controller::{Status, SyncEdges, VideoTimingController, VsyncOutcome};
use crate::priority::{Isr, Thread};
use crate::signal::BinarySignal;
use crate::standard::VideoStandard;
use crate::util::armv7m::{clear_pending_irqs, disable_irqs, enable_irqs, CycleClock};
use crate::util::measurement::{self, Probe};
use crate::util::spin_lock::{SpinLock, SpinLockGuard};
use crate::util::stm32::{configure_clocks_168mhz, CPU_HZ};

pub use self::spi_dma::SpiDma;

type Controller = VideoTimingController<'static, SpiDma, &'static BinarySignal>;

/// Only one driver instance may ever be created.
static DRIVER_INIT_FLAG: AtomicBool = AtomicBool::new(false);

/// Shared by all three interrupts, which run at one priority.
static CONTROLLER: SpinLock<Option<Controller>> = SpinLock::new(None);

/// Hardware only the sync interrupts touch.
struct SyncHw {
    exti: device::EXTI,
    clock: CycleClock,
}

static SYNC_HW: SpinLock<Option<SyncHw>> = SpinLock::new(None);

static STATUS: Status = Status::new();
static FRAME_READY: BinarySignal = BinarySignal::new();

/// Priority shared by the overlay interrupts.
const OSD_PRIORITY: u8 = 0x10;
/// The line-start timer preempts the rest so that lines start on time.
const LINE_START_PRIORITY: u8 = 0x00;

const SYNC_IRQS: [device::Interrupt; 2] = [device::Interrupt::EXTI4, device::Interrupt::EXTI9_5];
const OSD_IRQS: [device::Interrupt; 4] = [
    device::Interrupt::TIM2,
    device::Interrupt::DMA2_STREAM5,
    device::Interrupt::EXTI9_5,
    device::Interrupt::EXTI4,
];

/// EXTI lines for PC4 and PC5.
const SYNC_LINES: u32 = (1 << 4) | (1 << 5);

/// Thread-side driver handle.
pub struct Osd {
    draw: DrawSide<'static>,
    nvic: cm::NVIC,
}

impl Osd {
    pub fn status(&self) -> &'static Status {
        &STATUS
    }

    pub fn standard(&self) -> VideoStandard {
        STATUS.detected_standard()
    }

    /// Waits for the next redraw field, then hands `f` a canvas over the draw
    /// buffer, sized for the detected standard. The buffers can't swap until
    /// `f` returns.
    ///
    /// Returns `None` without drawing if sync processing is faulted, since no
    /// release will come until `re_enable`.
    pub fn draw_frame<R>(
        &mut self,
        thread: &Thread,
        f: impl FnOnce(&mut Canvas, VideoStandard) -> R,
    ) -> Option<R> {
        if !FRAME_READY.wait(|| STATUS.is_faulted()) {
            return None;
        }
        let _probe = measurement::span(Probe::Drawing);

        let standard = STATUS.detected_standard();
        let mut guard = self.draw.lock(thread);
        let mut canvas = Canvas::new(&mut guard, standard.timing().bounds);
        Some(f(&mut canvas, standard))
    }

    /// Clears a sync fault and unmasks the sync interrupts.
    pub fn re_enable(&mut self) {
        STATUS.re_enable();
        // Safety: EXTI_IMR is otherwise only written by the sync interrupts,
        // and those are masked while faulted.
        let exti = unsafe { &*device::EXTI::ptr() };
        exti.pr.write(|w| unsafe { w.bits(SYNC_LINES) });
        exti.imr
            .modify(|r, w| unsafe { w.bits(r.bits() | SYNC_LINES) });
        clear_pending_irqs(&mut self.nvic, &SYNC_IRQS);
        // The fault only masks EXTI; this covers an application that also
        // disabled the NVIC lines.
        enable_irqs(&mut self.nvic, &SYNC_IRQS);
    }
}

/// Starts the overlay, taking the peripherals it needs.
///
/// The system clock is switched to 168MHz. On return, sync interrupts are
/// live and the first redraw field will be signalled once the incoming video
/// has been measured.
///
/// # Panics
///
/// If called more than once.
pub fn init(
    config: OsdConfig,
    mut nvic: cm::NVIC,
    dcb: &mut cm::DCB,
    dwt: &mut cm::DWT,
    flash: device::FLASH,
    rcc: device::RCC,
    syscfg: device::SYSCFG,
    exti: device::EXTI,
    gpioa: device::GPIOA,
    gpiob: device::GPIOB,
    gpioc: device::GPIOC,
    dma1: device::DMA1,
    dma2: device::DMA2,
    spi1: device::SPI1,
    spi2: device::SPI2,
    tim2: device::TIM2,
) -> Result<Osd, ConfigError> {
    config.validate()?;

    unsafe {
        measurement::init();
    }

    let previous_instance = DRIVER_INIT_FLAG.swap(true, Ordering::SeqCst);
    assert_eq!(previous_instance, false);

    disable_irqs(&mut nvic, &OSD_IRQS);

    configure_clocks_168mhz(&rcc, &flash);
    // Flash cache and prefetch keep interrupt latency steady.
    flash
        .acr
        .modify(|_, w| w.dcen().enabled().icen().enabled().prften().enabled());

    rcc.ahb1enr.modify(|_, w| {
        w.gpioaen()
            .enabled()
            .gpioben()
            .enabled()
            .gpiocen()
            .enabled()
            .dma1en()
            .enabled()
            .dma2en()
            .enabled()
    });
    rcc.apb1enr
        .modify(|_, w| w.spi2en().enabled().tim2en().enabled());
    rcc.apb2enr
        .modify(|_, w| w.spi1en().enabled().syscfgen().enabled());
    cortex_m::asm::dsb();

    // Pixel outputs: AF5 on PA7 and PB15.
    gpioa.ospeedr.modify(|_, w| w.ospeedr7().very_high_speed());
    gpioa.afrl.modify(|_, w| w.afrl7().af5());
    gpioa.moder.modify(|_, w| w.moder7().alternate());
    gpiob.ospeedr.modify(|_, w| w.ospeedr15().very_high_speed());
    gpiob.afrh.modify(|_, w| w.afrh15().af5());
    gpiob.moder.modify(|_, w| w.moder15().alternate());

    // Sync inputs on PC4/PC5, falling edge.
    gpioc
        .moder
        .modify(|_, w| w.moder4().input().moder5().input());
    gpioc
        .pupdr
        .modify(|_, w| w.pupdr4().pull_up().pupdr5().pull_up());
    syscfg
        .exticr2
        .modify(|_, w| unsafe { w.exti4().bits(0b0010).exti5().bits(0b0010) });
    exti.ftsr
        .modify(|r, w| unsafe { w.bits(r.bits() | SYNC_LINES) });
    exti.rtsr
        .modify(|r, w| unsafe { w.bits(r.bits() & !SYNC_LINES) });
    exti.pr.write(|w| unsafe { w.bits(SYNC_LINES) });
    exti.imr
        .modify(|r, w| unsafe { w.bits(r.bits() | SYNC_LINES) });

    let clock = CycleClock::start(dcb, dwt, CPU_HZ);

    static mut BUFFERS: BufferPair = BufferPair::new();
    // Safety: DRIVER_INIT_FLAG ensures this runs once, so this is the only
    // reference ever taken.
    let (display, draw) = unsafe { BUFFERS.split() };

    let controller = VideoTimingController::new(
        config,
        SpiDma::new(dma1, dma2, spi1, spi2, tim2),
        display,
        &FRAME_READY,
        &STATUS,
    )?;
    *CONTROLLER.lock() = Some(controller);
    *SYNC_HW.lock() = Some(SyncHw { exti, clock });

    // Safety: our interrupts are disabled, so nothing observes the change.
    unsafe {
        nvic.set_priority(device::Interrupt::EXTI4, OSD_PRIORITY);
        nvic.set_priority(device::Interrupt::EXTI9_5, OSD_PRIORITY);
        nvic.set_priority(device::Interrupt::DMA2_STREAM5, OSD_PRIORITY);
        nvic.set_priority(device::Interrupt::TIM2, LINE_START_PRIORITY);
    }
    clear_pending_irqs(&mut nvic, &OSD_IRQS);
    enable_irqs(&mut nvic, &OSD_IRQS);

    #[cfg(feature = "defmt")]
    defmt::info!("overlay running");

    Ok(Osd { draw, nvic })
}

/// Starts the overlay with all device peripherals. Shorthand for `init` when
/// the application needs nothing else.
pub fn take_hardware(config: OsdConfig) -> Result<Osd, ConfigError> {
    let mut cp = cortex_m::Peripherals::take().unwrap();
    let p = device::Peripherals::take().unwrap();
    init(
        config, cp.NVIC, &mut cp.DCB, &mut cp.DWT, p.FLASH, p.RCC, p.SYSCFG, p.EXTI, p.GPIOA,
        p.GPIOB, p.GPIOC, p.DMA1, p.DMA2, p.SPI1, p.SPI2, p.TIM2,
    )
}

/// Gets hardware loaned to the interrupts.
///
/// # Panics
///
/// If the lock is held, which means two handlers raced (they shouldn't:
/// they share a priority) or an interrupt was enabled before `init` stored
/// the hardware. Also if the hardware isn't there yet.
fn acquire_hw<T: Send>(lock: &SpinLock<Option<T>>) -> SpinLockGuard<T> {
    SpinLockGuard::map(lock.try_lock().expect("HW lock held at ISR"), |o| {
        o.as_mut().expect("ISR fired without HW available")
    })
}

/// Vertical sync handler; call from `EXTI4`.
pub fn vsync_isr() {
    let _probe = measurement::span(Probe::VerticalSync);
    let mut hw = acquire_hw(&SYNC_HW);
    hw.exti.pr.write(|w| unsafe { w.bits(1 << 4) });
    let now = hw.clock.now_us();

    let isr = unsafe { Isr::new() };
    if acquire_hw(&CONTROLLER).on_vertical_sync(now, &isr) == VsyncOutcome::Faulted {
        // Stop taking sync interrupts until `Osd::re_enable`.
        hw.exti
            .imr
            .modify(|r, w| unsafe { w.bits(r.bits() & !SYNC_LINES) });
    }
}

/// Horizontal sync handler; call from `EXTI9_5`.
pub fn hsync_isr() {
    let _probe = measurement::span(Probe::HorizontalSync);
    acquire_hw(&SYNC_HW)
        .exti
        .pr
        .write(|w| unsafe { w.bits(1 << 5) });
    let isr = unsafe { Isr::new() };
    acquire_hw(&CONTROLLER).on_horizontal_sync(&isr);
}

/// Line transfer complete handler; call from `DMA2_STREAM5`.
pub fn transfer_isr() {
    let _probe = measurement::span(Probe::Transfer);
    let mut controller = acquire_hw(&CONTROLLER);
    controller.streamer().peripheral().acknowledge();
    let isr = unsafe { Isr::new() };
    controller.on_transfer_complete(&isr);
}

/// Line start timer handler; call from `TIM2`.
pub fn line_start_isr() {
    spi_dma::start_line()
}
