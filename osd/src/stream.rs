//! Per-line streaming of the display buffer to the pixel shifters.

use osd_gfx::FrameBuffer;

use crate::standard::StandardTiming;

/// The hardware that shifts one line of both planes out to the video mixer.
pub trait ScanlinePeripheral {
    /// Prepares for lines of the given geometry.
    fn configure(&mut self, timing: &StandardTiming);

    /// Whether the previous line is still being shifted out.
    fn is_busy(&self) -> bool;

    /// Starts shifting `length` bytes of each plane of `fb` from `offset`.
    /// Must not wait for the transfer, and must only be called while idle.
    ///
    /// The transfer may outlive the call; `fb` stays untouched until the
    /// end of the field, when the buffers swap.
    fn arm(&mut self, fb: &FrameBuffer, offset: usize, length: usize);

    /// Abandons any transfer in progress. When this returns nothing more is
    /// read from the buffer last passed to `arm`.
    fn stop(&mut self);
}

/// What happened to a line handed to `ScanlineStreamer::stream_line`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmOutcome {
    Armed,
    /// The previous line hadn't finished; this one is dropped.
    Busy,
    /// Not a visible line of the current standard.
    OutOfRange,
}

/// Emitted once per redraw field, after its final line has gone out.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrameComplete;

/// Drives a `ScanlinePeripheral` through one field at a time.
pub struct ScanlineStreamer<P> {
    peripheral: P,
    timing: &'static StandardTiming,
    redraw: bool,
    /// The last visible line's transfer was started this field.
    final_armed: bool,
    /// This field's completion has been reported (or suppressed).
    done: bool,
}

impl<P: ScanlinePeripheral> ScanlineStreamer<P> {
    pub fn new(mut peripheral: P, timing: &'static StandardTiming) -> Self {
        peripheral.configure(timing);
        ScanlineStreamer {
            peripheral,
            timing,
            redraw: false,
            final_armed: false,
            done: true,
        }
    }

    pub fn timing(&self) -> &'static StandardTiming {
        self.timing
    }

    /// Switches to a new standard's geometry. Takes effect on the next line
    /// armed.
    pub fn configure(&mut self, timing: &'static StandardTiming) {
        self.timing = timing;
        self.peripheral.configure(timing);
    }

    /// Starts a field. `redraw` selects whether its completion is reported.
    pub fn begin_frame(&mut self, redraw: bool) {
        self.redraw = redraw;
        self.final_armed = false;
        self.done = false;
    }

    /// Arms the transfer for visible line `line`, read from `offset` in each
    /// plane of `fb`. Lines are dropped rather than torn if the previous one
    /// is still in flight.
    pub fn stream_line(&mut self, fb: &FrameBuffer, line: usize, offset: usize) -> ArmOutcome {
        if line >= self.timing.visible_lines {
            return ArmOutcome::OutOfRange;
        }
        if self.peripheral.is_busy() {
            return ArmOutcome::Busy;
        }
        self.peripheral.arm(fb, offset, self.timing.line_bytes);
        if line + 1 == self.timing.visible_lines {
            self.final_armed = true;
        }
        ArmOutcome::Armed
    }

    /// Handles a transfer-complete event. Reports the field complete if this
    /// was its final line.
    pub fn on_transfer_complete(&mut self) -> Option<FrameComplete> {
        if self.final_armed {
            self.close()
        } else {
            None
        }
    }

    /// Closes the field if its completion never fired, e.g. because the last
    /// line was dropped.
    ///
    /// A transfer still running at this point is cut short: once the field
    /// is reported complete its buffer can go to the drawing task.
    pub fn finish_frame(&mut self) -> Option<FrameComplete> {
        if !self.done && self.peripheral.is_busy() {
            self.peripheral.stop();
        }
        self.close()
    }

    fn close(&mut self) -> Option<FrameComplete> {
        if self.done {
            return None;
        }
        self.done = true;
        if self.redraw {
            Some(FrameComplete)
        } else {
            None
        }
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::standard::{NTSC, PAL};

    /// Records transfers; stays busy until `complete` is called.
    #[derive(Default)]
    pub(crate) struct MockPeripheral {
        pub busy: bool,
        pub line_bytes: usize,
        pub configured: usize,
        pub stopped: usize,
        /// `(buffer address, offset, length)` of every armed transfer.
        pub armed: Vec<(usize, usize, usize)>,
    }

    impl MockPeripheral {
        pub fn complete(&mut self) {
            self.busy = false;
        }
    }

    impl ScanlinePeripheral for MockPeripheral {
        fn configure(&mut self, timing: &StandardTiming) {
            self.line_bytes = timing.line_bytes;
            self.configured += 1;
        }

        fn is_busy(&self) -> bool {
            self.busy
        }

        fn arm(&mut self, fb: &FrameBuffer, offset: usize, length: usize) {
            assert!(!self.busy, "armed while busy");
            self.busy = true;
            self.armed.push((fb as *const FrameBuffer as usize, offset, length));
        }

        fn stop(&mut self) {
            self.busy = false;
            self.stopped += 1;
        }
    }

    #[test]
    fn streams_lines_and_reports_completion_once() {
        let fb = Box::new(FrameBuffer::new());
        let mut s = ScanlineStreamer::new(MockPeripheral::default(), &NTSC);
        assert_eq!(s.peripheral().line_bytes, 42);

        s.begin_frame(true);
        for line in 0..NTSC.visible_lines {
            assert_eq!(s.stream_line(&fb, line, NTSC.line_offset(line)), ArmOutcome::Armed);
            s.peripheral_mut().complete();
            let done = s.on_transfer_complete();
            assert_eq!(done.is_some(), line == NTSC.visible_lines - 1, "line {}", line);
        }
        assert_eq!(s.on_transfer_complete(), None);
        assert_eq!(s.finish_frame(), None);

        let armed = &s.peripheral().armed;
        assert_eq!(armed.len(), 240);
        assert_eq!(armed[10].1, 10 * osd_gfx::BUFFER_WIDTH);
        assert!(armed.iter().all(|a| a.2 == 42));
    }

    #[test]
    fn busy_lines_are_dropped() {
        let fb = Box::new(FrameBuffer::new());
        let mut s = ScanlineStreamer::new(MockPeripheral::default(), &PAL);
        s.begin_frame(true);
        assert_eq!(s.stream_line(&fb, 0, 0), ArmOutcome::Armed);
        assert_eq!(s.stream_line(&fb, 1, 44), ArmOutcome::Busy);
        assert_eq!(s.stream_line(&fb, 266, 0), ArmOutcome::OutOfRange);
        assert_eq!(s.peripheral().armed.len(), 1);
    }

    #[test]
    fn dropped_final_line_is_closed_by_finish() {
        let fb = Box::new(FrameBuffer::new());
        let mut s = ScanlineStreamer::new(MockPeripheral::default(), &NTSC);
        s.begin_frame(true);
        s.peripheral_mut().busy = true;
        assert_eq!(s.stream_line(&fb, 239, 0), ArmOutcome::Busy);
        s.peripheral_mut().complete();
        assert_eq!(s.on_transfer_complete(), None);
        assert_eq!(s.finish_frame(), Some(FrameComplete));
        assert_eq!(s.finish_frame(), None);
    }

    #[test]
    fn finish_stops_transfer_in_flight() {
        let fb = Box::new(FrameBuffer::new());
        let mut s = ScanlineStreamer::new(MockPeripheral::default(), &NTSC);
        s.begin_frame(true);
        assert_eq!(s.stream_line(&fb, 100, 100 * 44), ArmOutcome::Armed);
        assert!(s.peripheral().is_busy());
        assert_eq!(s.finish_frame(), Some(FrameComplete));
        assert_eq!(s.peripheral().stopped, 1);
        assert!(!s.peripheral().is_busy());

        // Idle at the end of the field: nothing to stop.
        s.begin_frame(true);
        assert_eq!(s.finish_frame(), Some(FrameComplete));
        assert_eq!(s.peripheral().stopped, 1);
    }

    #[test]
    fn plain_fields_report_nothing() {
        let fb = Box::new(FrameBuffer::new());
        let mut s = ScanlineStreamer::new(MockPeripheral::default(), &NTSC);
        s.begin_frame(false);
        s.stream_line(&fb, 239, 0);
        assert_eq!(s.on_transfer_complete(), None);
        assert_eq!(s.finish_frame(), None);
    }

    #[test]
    fn reconfigure_changes_line_length() {
        let fb = Box::new(FrameBuffer::new());
        let mut s = ScanlineStreamer::new(MockPeripheral::default(), &NTSC);
        s.configure(&PAL);
        assert_eq!(s.peripheral().configured, 2);
        s.begin_frame(false);
        s.stream_line(&fb, 0, 0);
        assert_eq!(s.peripheral().armed[0].2, 44);
    }
}
