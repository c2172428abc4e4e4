//! Two-plane overlay graphics.
//!
//! Everything here draws into a [`FrameBuffer`], which holds a *mask* plane
//! (is the overlay pixel opaque?) and a *level* plane (is the opaque pixel
//! white or black?). Drawing goes through a [`Canvas`], which pairs a
//! framebuffer with the drawable rectangle of the active video standard and
//! silently discards anything that falls outside it.
//!
//! This module is deliberately architecture-independent to allow for testing on
//! the host.
//!
//! [`FrameBuffer`]: fb/struct.FrameBuffer.html
//! [`Canvas`]: canvas/struct.Canvas.html

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod blit;
pub mod canvas;
pub mod fb;
pub mod image;
pub mod shape;
pub mod text;
pub mod vscale;

pub use crate::canvas::Canvas;
pub use crate::fb::{FrameBuffer, Mode, Plane, BUFFER_HEIGHT, BUFFER_WIDTH};
pub use crate::text::{Dimensions, Font, Glyphs, HAlign, VAlign};

/// Per-plane compositing modes used for a single drawing operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pen {
    pub mask: Mode,
    pub level: Mode,
}

impl Pen {
    /// Opaque white.
    pub const WHITE: Pen = Pen {
        mask: Mode::Set,
        level: Mode::Set,
    };
    /// Opaque black.
    pub const BLACK: Pen = Pen {
        mask: Mode::Set,
        level: Mode::Clear,
    };
    /// Transparent; lets the incoming video through.
    pub const ERASE: Pen = Pen {
        mask: Mode::Clear,
        level: Mode::Clear,
    };

    pub const fn new(mask: Mode, level: Mode) -> Self {
        Pen { mask, level }
    }
}

/// Selects the level written by the stroke (border) and fill (body) passes of
/// outlined shapes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutlineStyle {
    /// Black border around a white body.
    BlackOutline,
    /// White border around a black body.
    WhiteOutline,
}

impl OutlineStyle {
    /// Produces the `(stroke, fill)` pens for this style. Both use
    /// `mask_mode` on the mask plane.
    pub fn pens(self, mask_mode: Mode) -> (Pen, Pen) {
        let (stroke, fill) = match self {
            OutlineStyle::BlackOutline => (Mode::Clear, Mode::Set),
            OutlineStyle::WhiteOutline => (Mode::Set, Mode::Clear),
        };
        (Pen::new(mask_mode, stroke), Pen::new(mask_mode, fill))
    }
}

impl Default for OutlineStyle {
    fn default() -> Self {
        OutlineStyle::BlackOutline
    }
}

/// How the ends of outlined horizontal and vertical lines are finished.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Endcap {
    /// Leave the end open.
    None,
    /// A single stroke pixel on the line's axis.
    Round,
    /// A three-pixel stroke perpendicular to the line.
    Flat,
}

/// Drawable rectangle. The left and top edges are always zero; `right` and
/// `bottom` are inclusive.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Bounds {
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub const fn new(right: i32, bottom: i32) -> Self {
        Bounds { right, bottom }
    }

    /// Width of the drawable area in pixels.
    pub fn width(&self) -> i32 {
        self.right + 1
    }

    /// Height of the drawable area in pixels.
    pub fn height(&self) -> i32 {
        self.bottom + 1
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x <= self.right && y >= 0 && y <= self.bottom
    }
}

/// A vertex of a polygon, relative to its pivot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }
}

impl From<(i16, i16)> for Point {
    fn from((x, y): (i16, i16)) -> Self {
        Point { x, y }
    }
}
