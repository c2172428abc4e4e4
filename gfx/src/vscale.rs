//! Moving vertical tape gauge (speed, altitude).

use core::fmt::Write;

use arrayvec::{Array, ArrayString};

use crate::canvas::Canvas;
use crate::fb::Mode;
use crate::text::{measure, Font, HAlign, VAlign};
use crate::{Endcap, OutlineStyle, Pen};

type Label = ArrayString<[u8; 16]>;

/// Formats `n`, zero-padded to two digits if `pad`. `None` if it doesn't
/// fit, rather than a truncated number.
fn number<A>(n: i32, pad: bool) -> Option<ArrayString<A>>
where
    A: Array<Item = u8> + Copy,
{
    let mut text = ArrayString::new();
    let written = if pad {
        write!(text, "{:02}", n)
    } else {
        write!(text, "{}", n)
    };
    written.ok().map(|_| text)
}

/// Which side of the screen the scale is mounted on. A scale on the left
/// grows its ticks and labels to the right, and vice versa.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScaleSide {
    Left,
    Right,
}

impl ScaleSide {
    fn dir(self) -> i32 {
        match self {
            ScaleSide::Left => 1,
            ScaleSide::Right => -1,
        }
    }
}

/// Geometry and tick spacing of a vertical scale.
#[derive(Copy, Clone, Debug)]
pub struct VerticalScale {
    /// Span of values shown, centered on the live value.
    pub range: i32,
    pub side: ScaleSide,
    /// Column the ticks grow from.
    pub x: i32,
    /// Row of the center of the scale.
    pub y: i32,
    pub height: i32,
    pub minor_step: i32,
    pub major_step: i32,
    pub minor_len: i32,
    pub major_len: i32,
    pub boundary_len: i32,
    /// Hide negative labels, and shift ticks by half a major step so that
    /// zero is not marked.
    pub no_negative: bool,
}

impl VerticalScale {
    /// Draws the scale centered on `value`. Tick labels use `label_font`; the
    /// boxed live value uses `value_font`.
    pub fn draw(&self, canvas: &mut Canvas, value: i32, label_font: &Font, value_font: &Font) {
        if self.range <= 0 || self.minor_step <= 0 || self.major_step <= 0 {
            return;
        }
        let dir = self.side.dir();
        let major_end = self.x + dir * self.major_len;
        let minor_end = self.x + dir * self.minor_len;
        let boundary_end = self.x + dir * self.boundary_len;
        let caps = (Endcap::Flat, Endcap::Flat);
        let style = OutlineStyle::BlackOutline;

        let arrow_len = i32::from(value_font.height) / 2 + 1;
        let text_x_spacing = i32::from(value_font.width) / 2;
        let half = self.range / 2;

        for r in -half..=half {
            let mut rr = r + half - value;
            let shown = half - rr;
            if self.no_negative {
                rr += self.major_step / 2;
                if shown < 0 {
                    continue;
                }
            }
            let major = rr % self.major_step == 0;
            if !major && rr % self.minor_step != 0 {
                continue;
            }

            let ys = r * self.height / self.range + self.y;
            if major {
                canvas.hline_outlined(self.x, major_end, ys, caps, style, Mode::Set);
                let label: Label = match number(shown, false) {
                    Some(l) => l,
                    None => continue,
                };
                match self.side {
                    ScaleSide::Left => canvas.draw_string(
                        &label,
                        major_end + text_x_spacing + 1,
                        ys,
                        1,
                        0,
                        VAlign::Middle,
                        HAlign::Left,
                        label_font,
                    ),
                    ScaleSide::Right => canvas.draw_string(
                        &label,
                        major_end - text_x_spacing + 1,
                        ys,
                        1,
                        0,
                        VAlign::Middle,
                        HAlign::Right,
                        label_font,
                    ),
                }
            } else {
                canvas.hline_outlined(self.x, minor_end, ys, caps, style, Mode::Set);
            }
        }

        self.draw_value_box(canvas, value, major_end + dir * text_x_spacing, arrow_len, value_font);

        let top = self.y - self.height / 2;
        let bottom = self.y + self.height / 2;
        canvas.hline_outlined(self.x, boundary_end, bottom, caps, style, Mode::Set);
        canvas.hline_outlined(self.x, boundary_end, top, caps, style, Mode::Set);
    }

    /// Draws the live value in a black box whose arrow-shaped end points at
    /// the scale's center, starting at column `xx`.
    fn draw_value_box(&self, canvas: &mut Canvas, value: i32, xx: i32, arrow_len: i32, font: &Font) {
        let text: Label = match number(value, true) {
            Some(t) => t,
            None => return,
        };
        let width = measure(&text, font, 1, 0).width + 4;
        let dir = self.side.dir();
        let yc = self.y + 1;
        let top = yc - arrow_len;
        let bottom = yc + arrow_len - 2;
        // Far edge of the box.
        let edge = xx + dir * (width - 1);

        for i in 0..arrow_len {
            let tip = xx - dir * (arrow_len - i);
            // Fill strictly between the arrow tip and the far edge.
            let (a, b) = if dir > 0 { (tip + 1, edge) } else { (edge + 1, tip) };
            for &row in &[yc - i - 1, yc + i - 1] {
                canvas.pixel(tip, row, Pen::WHITE);
                canvas.hline(a, b, row, Pen::BLACK);
            }
        }
        let (lo, hi) = if dir > 0 { (xx, edge) } else { (edge, xx) };
        canvas.hline(lo, hi + 1, top, Pen::WHITE);
        canvas.hline(lo, hi + 1, bottom, Pen::WHITE);
        canvas.vline(edge, top, bottom + 1, Pen::WHITE);

        canvas.draw_string(
            &text,
            xx + dir * (width / 2),
            yc - 1,
            1,
            0,
            VAlign::Middle,
            HAlign::Center,
            font,
        );
    }
}
