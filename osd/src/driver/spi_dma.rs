//! Line scanout through two SPI transmitters fed by DMA.
//!
//! The mask plane goes out of SPI1 (PA7) on DMA2 stream 5, the level plane
//! out of SPI2 (PB15) on DMA1 stream 4. Both are clocked at 10.5MHz, so the
//! planes stay aligned to within the few cycles between the two enables.
//!
//! Arming a line loads both streams and starts TIM2 in one-pulse mode. The
//! streams are enabled from the TIM2 update interrupt (`start_line`) when the
//! back porch has passed, so the horizontal sync handler never waits.

use core::sync::atomic::{AtomicBool, Ordering};

use stm32f4::stm32f407 as device;

use osd_gfx::{FrameBuffer, Plane};

use crate::standard::StandardTiming;
use crate::stream::ScanlinePeripheral;
use crate::util::stm32::APB1_TIMER_HZ;

/// SPI CR1: transmit-only master, software NSS, MSB first.
const SPI_CR1_TX_MASTER: u32 = (1 << 15) | (1 << 14) | (1 << 9) | (1 << 8) | (1 << 2);
const SPI_CR1_SPE: u32 = 1 << 6;
/// Baud rate field values: APB2 84MHz / 8 and APB1 42MHz / 4.
const SPI1_BR_DIV8: u32 = 0b010 << 3;
const SPI2_BR_DIV4: u32 = 0b001 << 3;
const SPI_CR2_TXDMAEN: u32 = 1 << 1;

/// TIM CR1: one-pulse, update only on overflow, counter enable.
const TIM_CR1_OPM: u32 = 1 << 3;
const TIM_CR1_URS: u32 = 1 << 2;
const TIM_CR1_CEN: u32 = 1 << 0;
const TIM_DIER_UIE: u32 = 1 << 0;

/// A line is loaded and waiting for TIM2 to start it.
static STARTING: AtomicBool = AtomicBool::new(false);

pub struct SpiDma {
    dma1: device::DMA1,
    dma2: device::DMA2,
    spi1: device::SPI1,
    spi2: device::SPI2,
    tim2: device::TIM2,
    /// TIM2 ticks from the horizontal sync edge to the first overlay pixel.
    first_column_ticks: u32,
}

impl SpiDma {
    /// Sets up both SPI transmitters, their DMA streams and the line-start
    /// timer. The clocks for all five peripherals and the GPIOs must already
    /// be on.
    pub fn new(
        dma1: device::DMA1,
        dma2: device::DMA2,
        spi1: device::SPI1,
        spi2: device::SPI2,
        tim2: device::TIM2,
    ) -> Self {
        spi1.cr1
            .write(|w| unsafe { w.bits(SPI_CR1_TX_MASTER | SPI1_BR_DIV8) });
        spi2.cr1
            .write(|w| unsafe { w.bits(SPI_CR1_TX_MASTER | SPI2_BR_DIV4) });
        spi1.cr2.write(|w| unsafe { w.bits(SPI_CR2_TXDMAEN) });
        spi2.cr2.write(|w| unsafe { w.bits(SPI_CR2_TXDMAEN) });
        spi1.cr1.modify(|r, w| unsafe { w.bits(r.bits() | SPI_CR1_SPE) });
        spi2.cr1.modify(|r, w| unsafe { w.bits(r.bits() | SPI_CR1_SPE) });

        dma2.s5par
            .write(|w| unsafe { w.bits(&spi1.dr as *const _ as u32) });
        dma1.s4par
            .write(|w| unsafe { w.bits(&spi2.dr as *const _ as u32) });

        // Byte-wide memory-to-peripheral, incrementing memory. Only the mask
        // stream interrupts; the level stream finishes within a few cycles
        // of it.
        dma2.s5cr.write(|w| {
            w.chsel()
                .bits(3)
                .pl()
                .very_high()
                .dir()
                .memory_to_peripheral()
                .minc()
                .set_bit()
                .psize()
                .byte()
                .msize()
                .byte()
                .tcie()
                .set_bit()
        });
        dma1.s4cr.write(|w| {
            w.chsel()
                .bits(0)
                .pl()
                .very_high()
                .dir()
                .memory_to_peripheral()
                .minc()
                .set_bit()
                .psize()
                .byte()
                .msize()
                .byte()
        });

        tim2.psc.write(|w| unsafe { w.bits(0) });
        tim2.cr1
            .write(|w| unsafe { w.bits(TIM_CR1_OPM | TIM_CR1_URS) });
        tim2.sr.write(|w| unsafe { w.bits(0) });
        tim2.dier.write(|w| unsafe { w.bits(TIM_DIER_UIE) });

        SpiDma {
            dma1,
            dma2,
            spi1,
            spi2,
            tim2,
            first_column_ticks: 1,
        }
    }

    /// Clears the transfer-complete flags. Call from the DMA interrupt.
    pub fn acknowledge(&self) {
        self.dma2.hifcr.write(|w| {
            w.ctcif5()
                .set_bit()
                .chtif5()
                .set_bit()
                .cteif5()
                .set_bit()
                .cdmeif5()
                .set_bit()
                .cfeif5()
                .set_bit()
        });
        self.dma1.hifcr.write(|w| {
            w.ctcif4()
                .set_bit()
                .chtif4()
                .set_bit()
                .cteif4()
                .set_bit()
                .cdmeif4()
                .set_bit()
                .cfeif4()
                .set_bit()
        });
    }

    /// Whether either transmitter still has bits on the wire.
    fn shifting(&self) -> bool {
        // SR.BSY
        (self.spi1.sr.read().bits() | self.spi2.sr.read().bits()) & (1 << 7) != 0
    }
}

impl ScanlinePeripheral for SpiDma {
    fn configure(&mut self, timing: &StandardTiming) {
        let ticks = u64::from(timing.first_column) * u64::from(APB1_TIMER_HZ) / 1_000_000_000;
        self.first_column_ticks = (ticks as u32).max(1);
    }

    fn is_busy(&self) -> bool {
        STARTING.load(Ordering::Acquire)
            || self.dma2.s5cr.read().en().bit_is_set()
            || self.dma1.s4cr.read().en().bit_is_set()
            || self.shifting()
    }

    fn arm(&mut self, fb: &FrameBuffer, offset: usize, length: usize) {
        let end = offset + length;
        let (mask, level) = match (
            fb.plane(Plane::Mask).get(offset..end),
            fb.plane(Plane::Level).get(offset..end),
        ) {
            (Some(m), Some(l)) => (m, l),
            _ => return,
        };

        self.acknowledge();
        self.dma2
            .s5m0ar
            .write(|w| unsafe { w.bits(mask.as_ptr() as u32) });
        self.dma1
            .s4m0ar
            .write(|w| unsafe { w.bits(level.as_ptr() as u32) });
        self.dma2.s5ndtr.write(|w| w.ndt().bits(length as u16));
        self.dma1.s4ndtr.write(|w| w.ndt().bits(length as u16));

        // Sit out the back porch in the timer, not here.
        STARTING.store(true, Ordering::Release);
        self.tim2
            .arr
            .write(|w| unsafe { w.bits(self.first_column_ticks) });
        self.tim2.cnt.write(|w| unsafe { w.bits(0) });
        self.tim2
            .cr1
            .write(|w| unsafe { w.bits(TIM_CR1_OPM | TIM_CR1_URS | TIM_CR1_CEN) });
    }

    fn stop(&mut self) {
        // Cleared first, so a start that fires from here on does nothing.
        STARTING.store(false, Ordering::Release);
        self.tim2
            .cr1
            .write(|w| unsafe { w.bits(TIM_CR1_OPM | TIM_CR1_URS) });
        self.dma1.s4cr.modify(|_, w| w.en().clear_bit());
        self.dma2.s5cr.modify(|_, w| w.en().clear_bit());
        // EN reads back set until the stream has let go of the bus.
        while self.dma1.s4cr.read().en().bit_is_set()
            || self.dma2.s5cr.read().en().bit_is_set()
        {}
    }
}

/// Starts the line loaded by `SpiDma::arm`. Call from the `TIM2` interrupt.
///
/// TIM2 runs above the other overlay interrupts so the start doesn't jitter,
/// which means it can't take the controller lock. It touches only the TIM2
/// status register and the enable bits of the two streams, and `SpiDma`
/// writes those only while `STARTING` is clear.
pub fn start_line() {
    // Safety: see above.
    let (tim2, dma1, dma2) = unsafe {
        (
            &*device::TIM2::ptr(),
            &*device::DMA1::ptr(),
            &*device::DMA2::ptr(),
        )
    };
    tim2.sr.write(|w| unsafe { w.bits(0) });
    if STARTING.swap(false, Ordering::AcqRel) {
        dma1.s4cr.modify(|_, w| w.en().set_bit());
        dma2.s5cr.modify(|_, w| w.en().set_bit());
    }
}
