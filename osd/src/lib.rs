//! Analog video overlay driver.
//!
//! The overlay watches the sync edges of a composite video signal and, on
//! each line inside the overlay area, shifts out one row of a two-plane
//! [`FrameBuffer`](../osd_gfx/fb/struct.FrameBuffer.html): the mask plane
//! decides where the overlay replaces the video, the level plane whether it is
//! white or black there. Drawing happens in thread mode on the other buffer
//! of a ping-pong pair, released once per redraw field.
//!
//! Everything except the `driver` module is hardware-independent so it can
//! be tested on the host.

#![cfg_attr(not(test), no_std)]

pub mod buffers;
pub mod config;
pub mod controller;
pub mod priority;
pub mod signal;
pub mod standard;
pub mod stream;
pub mod util;

pub use crate::config::{ConfigError, OsdConfig};
pub use crate::controller::{Status, SyncEdges, VideoTimingController, VsyncOutcome};
pub use crate::standard::VideoStandard;

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        mod driver;
        pub use crate::driver::*;
    }
}
