//! Sync-edge state machine.
//!
//! The controller follows the incoming video from its sync edges. Each
//! vertical sync starts a field: the previous field's line count decides the
//! standard (so a change takes effect one field late), and every
//! `redraw_divisor`th field is marked for redraw. Each horizontal sync
//! advances the line counter and, inside the overlay area, streams one line
//! of the display buffer. When the last line of a redraw field has gone out
//! the buffers swap and the drawing task is released.
//!
//! Vertical sync edges arriving implausibly fast are noise. A run of
//! `spurious_edge_limit` of them shuts sync processing down until
//! `Status::re_enable` is called, so a bad cable can't eat the CPU.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use osd_gfx::BUFFER_WIDTH;

use crate::buffers::{DisplaySide, SwapError};
use crate::config::{ConfigError, OsdConfig};
use crate::priority::Isr;
use crate::signal::FrameRelease;
use crate::standard::{AtomicStandard, VideoStandard};
use crate::stream::{ArmOutcome, FrameComplete, ScanlinePeripheral, ScanlineStreamer};

/// Entry points for the two sync interrupts.
pub trait SyncEdges {
    /// Handles a vertical sync edge seen at `timestamp_us` (a free-running
    /// microsecond clock; wrapping is fine).
    fn on_vertical_sync(&mut self, timestamp_us: u32, p: &Isr) -> VsyncOutcome;

    /// Handles a horizontal sync edge.
    fn on_horizontal_sync(&mut self, p: &Isr);
}

/// What the controller made of a vertical sync edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VsyncOutcome {
    /// A new field started.
    Accepted,
    /// Too soon after the previous edge; counted and otherwise ignored.
    Spurious,
    /// This edge reached the spurious limit. Sync processing is now off.
    Faulted,
    /// Sync processing is off.
    Ignored,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No trustworthy vertical sync yet: at startup, or after a fault.
    AwaitingSync,
    /// Counting lines of a field. `line` is relative to the first overlay
    /// line, so it is negative during the preroll.
    Streaming { line: i32 },
    /// Past the last overlay line, waiting for vertical sync.
    FrameBoundary,
}

/// Counters and flags shared with the drawing task.
#[derive(Debug, Default)]
pub struct Status {
    standard: AtomicStandard,
    measured_lines: AtomicUsize,
    dropped_lines: AtomicUsize,
    overruns: AtomicUsize,
    frames: AtomicUsize,
    spurious_edges: AtomicUsize,
    faulted: AtomicBool,
}

impl Status {
    pub const fn new() -> Self {
        Status {
            standard: AtomicStandard::new(),
            measured_lines: AtomicUsize::new(0),
            dropped_lines: AtomicUsize::new(0),
            overruns: AtomicUsize::new(0),
            frames: AtomicUsize::new(0),
            spurious_edges: AtomicUsize::new(0),
            faulted: AtomicBool::new(false),
        }
    }

    pub fn detected_standard(&self) -> VideoStandard {
        self.standard.load()
    }

    /// Lines counted in the last complete field.
    pub fn visible_line_count(&self) -> usize {
        self.measured_lines.load(Ordering::Relaxed)
    }

    /// Lines skipped because the previous transfer was still running.
    pub fn dropped_lines(&self) -> usize {
        self.dropped_lines.load(Ordering::Relaxed)
    }

    /// Redraw fields whose swap was skipped because drawing hadn't finished.
    pub fn overruns(&self) -> usize {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Fields started.
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::Relaxed)
    }

    /// Current run of consecutive spurious vertical sync edges.
    pub fn spurious_edges(&self) -> usize {
        self.spurious_edges.load(Ordering::Relaxed)
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }

    /// Clears a sync fault and resumes edge processing.
    pub fn re_enable(&self) {
        self.spurious_edges.store(0, Ordering::Relaxed);
        self.faulted.store(false, Ordering::Release);
        #[cfg(feature = "defmt")]
        defmt::info!("sync processing re-enabled");
    }
}

pub struct VideoTimingController<'a, P, R> {
    config: OsdConfig,
    streamer: ScanlineStreamer<P>,
    display: DisplaySide<'a>,
    release: R,
    status: &'a Status,
    phase: Phase,
    /// Horizontal syncs since the last accepted vertical sync.
    lines_this_field: u32,
    /// When the last accepted vertical sync arrived. Spurious edges are
    /// measured against this, never against each other.
    last_vsync_us: Option<u32>,
    field: u32,
    /// Plane offset of the next line to stream.
    cursor: usize,
}

impl<'a, P, R> VideoTimingController<'a, P, R>
where
    P: ScanlinePeripheral,
    R: FrameRelease,
{
    pub fn new(
        config: OsdConfig,
        peripheral: P,
        display: DisplaySide<'a>,
        release: R,
        status: &'a Status,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        status.standard.store(VideoStandard::Unknown);
        Ok(VideoTimingController {
            config,
            streamer: ScanlineStreamer::new(peripheral, VideoStandard::Unknown.timing()),
            display,
            release,
            status,
            phase: Phase::AwaitingSync,
            lines_this_field: 0,
            last_vsync_us: None,
            field: 0,
            cursor: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Standard whose timing is in effect for the current field.
    pub fn standard(&self) -> VideoStandard {
        self.streamer.timing().standard
    }

    pub fn streamer(&self) -> &ScanlineStreamer<P> {
        &self.streamer
    }

    pub fn streamer_mut(&mut self) -> &mut ScanlineStreamer<P> {
        &mut self.streamer
    }

    /// Handles the streaming peripheral's transfer-complete event.
    pub fn on_transfer_complete(&mut self, _: &Isr) {
        if let Some(done) = self.streamer.on_transfer_complete() {
            self.frame_complete(done);
        }
    }

    fn frame_complete(&mut self, _: FrameComplete) {
        match self.display.try_swap() {
            Ok(_) => self.release.release(),
            Err(SwapError::DrawInProgress) => {
                self.status.overruns.fetch_add(1, Ordering::Relaxed);
                #[cfg(feature = "defmt")]
                defmt::debug!("drawing overran field {}", self.field);
            }
        }
    }

    /// Records a too-early vertical sync edge.
    fn spurious_edge(&mut self) -> VsyncOutcome {
        let run = self.status.spurious_edges.fetch_add(1, Ordering::Relaxed) + 1;
        if run < self.config.spurious_edge_limit as usize {
            return VsyncOutcome::Spurious;
        }
        self.status.faulted.store(true, Ordering::Release);
        self.phase = Phase::AwaitingSync;
        self.last_vsync_us = None;
        #[cfg(feature = "defmt")]
        defmt::warn!("{} spurious vsync edges; sync processing disabled", run);
        VsyncOutcome::Faulted
    }

    /// Closes out the field that just ended and picks the standard for the
    /// next one.
    fn end_field(&mut self) {
        if let Phase::Streaming { .. } = self.phase {
            // The field ended before its last overlay line.
            if let Some(done) = self.streamer.finish_frame() {
                self.frame_complete(done);
            }
        }

        let lines = self.lines_this_field;
        self.status
            .measured_lines
            .store(lines as usize, Ordering::Relaxed);
        let next = VideoStandard::classify(lines, self.config.pal_threshold_lines);
        if next != self.standard() {
            self.streamer.configure(next.timing());
            self.status.standard.store(next);
            #[cfg(feature = "defmt")]
            defmt::info!("video standard {} ({} lines)", next, lines);
        }
    }
}

impl<'a, P, R> SyncEdges for VideoTimingController<'a, P, R>
where
    P: ScanlinePeripheral,
    R: FrameRelease,
{
    fn on_vertical_sync(&mut self, timestamp_us: u32, _: &Isr) -> VsyncOutcome {
        if self.status.is_faulted() {
            return VsyncOutcome::Ignored;
        }
        if let Some(previous) = self.last_vsync_us {
            if timestamp_us.wrapping_sub(previous) < self.config.min_vsync_interval_us {
                // The field in progress carries on as if the edge never
                // happened.
                return self.spurious_edge();
            }
        }
        self.last_vsync_us = Some(timestamp_us);
        self.status.spurious_edges.store(0, Ordering::Relaxed);

        // A field seen from the middle tells us nothing about its length.
        if self.phase != Phase::AwaitingSync {
            self.end_field();
        }

        self.lines_this_field = 0;
        self.field = self.field.wrapping_add(1);
        self.status.frames.fetch_add(1, Ordering::Relaxed);
        let redraw = self.field % self.config.redraw_divisor == 0;
        self.streamer.begin_frame(redraw);
        self.phase = Phase::Streaming {
            line: -(self.streamer.timing().first_line as i32),
        };
        self.cursor = 0;
        VsyncOutcome::Accepted
    }

    fn on_horizontal_sync(&mut self, p: &Isr) {
        if self.status.is_faulted() {
            return;
        }
        self.lines_this_field = self.lines_this_field.saturating_add(1);

        let line = match self.phase {
            Phase::Streaming { line } => line + 1,
            _ => return,
        };
        if line >= self.streamer.timing().visible_lines as i32 {
            self.phase = Phase::FrameBoundary;
            if let Some(done) = self.streamer.finish_frame() {
                self.frame_complete(done);
            }
            return;
        }

        self.phase = Phase::Streaming { line };
        if line >= 0 {
            let fb = self.display.display(p);
            if self.streamer.stream_line(fb, line as usize, self.cursor) == ArmOutcome::Busy {
                self.status.dropped_lines.fetch_add(1, Ordering::Relaxed);
            }
            self.cursor += BUFFER_WIDTH;
        }
    }
}
