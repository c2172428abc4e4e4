//! Host simulation of the complete overlay.
//!
//! A synthetic sync signal drives the real `VideoTimingController`; the
//! scanline peripheral is a software mixer that records what each streamed
//! line would have put on screen. Drawing happens between fields, whenever
//! the controller releases a buffer, just as the drawing task would.

use core::fmt;

use osd::buffers::BufferPair;
use osd::priority::{Isr, Thread};
use osd::signal::BinarySignal;
use osd::standard::StandardTiming;
use osd::stream::ScanlinePeripheral;
use osd::{ConfigError, OsdConfig, Status, SyncEdges, VideoStandard, VideoTimingController};
use osd_gfx::{Canvas, FrameBuffer, Plane, BUFFER_WIDTH};

/// Duration of one video line.
const LINE_US: u32 = 64;

/// What the viewer sees at one overlay pixel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Pixel {
    /// The incoming video shows through.
    Video,
    White,
    Black,
}

/// The overlay area as last streamed, one row per overlay line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Screen {
    rows: Vec<Vec<Pixel>>,
}

impl Screen {
    pub fn rows(&self) -> &[Vec<Pixel>] {
        &self.rows
    }

    pub fn count(&self, p: Pixel) -> usize {
        self.rows.iter().flatten().filter(|&&q| q == p).count()
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            for p in row {
                f.write_str(match p {
                    Pixel::Video => ".",
                    Pixel::White => "#",
                    Pixel::Black => "o",
                })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Decodes `length` bytes of both planes from `offset` into pixels.
fn decode(fb: &FrameBuffer, offset: usize, length: usize) -> Option<Vec<Pixel>> {
    let end = offset + length;
    let mask = fb.plane(Plane::Mask).get(offset..end)?;
    let level = fb.plane(Plane::Level).get(offset..end)?;
    Some(
        mask.iter()
            .zip(level)
            .flat_map(|(&m, &l)| {
                (0..8).map(move |i| {
                    let bit = 0x80 >> i;
                    match (m & bit != 0, l & bit != 0) {
                        (false, _) => Pixel::Video,
                        (true, true) => Pixel::White,
                        (true, false) => Pixel::Black,
                    }
                })
            })
            .collect(),
    )
}

/// Scanline peripheral that finishes each line the moment it is armed.
#[derive(Default)]
struct Mixer {
    screen: Screen,
}

impl ScanlinePeripheral for Mixer {
    fn configure(&mut self, timing: &StandardTiming) {
        self.screen.rows.resize(timing.visible_lines, Vec::new());
    }

    fn is_busy(&self) -> bool {
        false
    }

    fn arm(&mut self, fb: &FrameBuffer, offset: usize, length: usize) {
        let row = offset / BUFFER_WIDTH;
        if let (Some(pixels), Some(slot)) = (decode(fb, offset, length), self.screen.rows.get_mut(row))
        {
            *slot = pixels;
        }
    }

    // Lines complete inside `arm`, so there is never anything to stop.
    fn stop(&mut self) {}
}

/// Outcome of a simulation run.
#[derive(Clone, Debug)]
pub struct Report {
    pub screen: Screen,
    pub standard: VideoStandard,
    pub frames: usize,
    pub redraws: usize,
    pub overruns: usize,
    pub dropped_lines: usize,
}

/// Feeds `fields` fields of `lines_per_field` lines each through the
/// controller. `draw` is called with the draw buffer each time a buffer is
/// released, along with the detected standard and the field number.
pub fn run(
    config: OsdConfig,
    lines_per_field: u32,
    fields: u32,
    mut draw: impl FnMut(&mut Canvas, VideoStandard, u32),
) -> Result<Report, ConfigError> {
    let status = Status::new();
    let signal = BinarySignal::new();
    let mut pair = Box::new(BufferPair::new());
    let (display, mut draw_side) = pair.split();
    let mut controller =
        VideoTimingController::new(config, Mixer::default(), display, &signal, &status)?;

    // Safety: the simulation is single threaded; "interrupt" and "thread"
    // code take turns and never overlap.
    let (isr, thread) = unsafe { (Isr::new(), Thread::new()) };

    let mut redraws = 0;
    for field in 0..fields {
        let now = field.wrapping_mul(lines_per_field * LINE_US);
        controller.on_vertical_sync(now, &isr);
        for _ in 0..lines_per_field {
            controller.on_horizontal_sync(&isr);
            controller.on_transfer_complete(&isr);
        }

        if signal.try_take() {
            let standard = status.detected_standard();
            let mut guard = draw_side.lock(&thread);
            draw(
                &mut Canvas::new(&mut guard, standard.timing().bounds),
                standard,
                field,
            );
            redraws += 1;
        }
    }

    Ok(Report {
        screen: controller.streamer().peripheral().screen.clone(),
        standard: status.detected_standard(),
        frames: status.frames(),
        redraws,
        overruns: status.overruns(),
        dropped_lines: status.dropped_lines(),
    })
}
