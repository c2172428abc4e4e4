//! What the firmware draws.

use core::fmt::Write;

use arrayvec::ArrayString;
#[cfg(target_os = "none")]
use libm::F32Ext;

use osd_fonts::{OUTLINED_12X18, OUTLINED_8X10};
use osd_gfx::shape::Border;
use osd_gfx::vscale::{ScaleSide, VerticalScale};
use osd_gfx::{Bounds, Canvas, HAlign, Mode, OutlineStyle, Pen, Point, VAlign};

type Text = ArrayString<[u8; 16]>;

/// Flight data shown on the HUD.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    /// km/h
    pub airspeed: i32,
    /// Meters above home.
    pub altitude: i32,
    /// Degrees, 0 to 359.
    pub heading: i32,
    /// Degrees, positive is right wing down.
    pub roll: f32,
    /// Degrees, positive is nose up.
    pub pitch: f32,
    /// Direction of home relative to the nose, degrees clockwise.
    pub home_bearing: f32,
    /// Meters.
    pub home_distance: u32,
    pub battery_mv: u32,
}

impl Telemetry {
    /// Synthetic data for field `frame`: a gentle climbing turn with some
    /// wobble, so every gauge moves.
    pub fn demo(frame: u32) -> Self {
        let t = frame as f32 / 50.;
        Telemetry {
            airspeed: 60 + (15. * (t * 0.7).sin()) as i32,
            altitude: 120 + (frame / 10 % 200) as i32,
            heading: (frame / 2 % 360) as i32,
            roll: 25. * (t * 0.5).sin(),
            pitch: 8. * (t * 0.3).cos(),
            home_bearing: 180. - (frame / 2 % 360) as f32,
            home_distance: 350 + frame % 1000,
            battery_mv: 12_600 - (frame / 25 % 1500),
        }
    }
}

/// Home direction arrowhead, pointing up before rotation.
static HOME_ARROW: [Point; 4] = [
    Point::new(0, -12),
    Point::new(8, 8),
    Point::new(0, 3),
    Point::new(-8, 8),
];

/// Pixels of horizon travel per degree of pitch.
const PITCH_SCALE: f32 = 2.;

pub struct Hud {
    bounds: Bounds,
    speed: VerticalScale,
    altitude: VerticalScale,
}

impl Hud {
    /// Lays the HUD out for a drawable area.
    pub fn new(bounds: Bounds) -> Self {
        let cy = bounds.height() / 2;
        let tape = VerticalScale {
            range: 60,
            side: ScaleSide::Left,
            x: 30,
            y: cy,
            height: bounds.height() * 2 / 3,
            minor_step: 5,
            major_step: 10,
            minor_len: 4,
            major_len: 8,
            boundary_len: 12,
            no_negative: false,
        };
        Hud {
            bounds,
            speed: VerticalScale {
                no_negative: true,
                ..tape
            },
            altitude: VerticalScale {
                side: ScaleSide::Right,
                x: bounds.right - 30,
                range: 100,
                major_step: 20,
                minor_step: 10,
                ..tape
            },
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Clears the canvas and draws a complete frame.
    pub fn draw(&self, canvas: &mut Canvas, t: &Telemetry) {
        canvas.clear();
        let cx = self.bounds.width() / 2;
        let cy = self.bounds.height() / 2;

        self.speed
            .draw(canvas, t.airspeed, &OUTLINED_8X10, &OUTLINED_12X18);
        self.altitude
            .draw(canvas, t.altitude, &OUTLINED_8X10, &OUTLINED_12X18);

        self.horizon(canvas, cx, cy, t);

        // Aircraft symbol and bank reference ring.
        canvas.circle_outlined(
            cx,
            cy,
            5,
            0,
            Border::Four,
            OutlineStyle::BlackOutline,
            Mode::Set,
        );
        canvas.circle(cx, cy, 48, 4, Pen::WHITE);

        self.heading(canvas, cx, t.heading);
        self.home(canvas, cx, t);

        let mut text = Text::new();
        let _ = write!(
            text,
            "{}.{}V",
            t.battery_mv / 1000,
            t.battery_mv % 1000 / 100
        );
        canvas.draw_string(
            &text,
            4,
            self.bounds.bottom - 2,
            1,
            1,
            VAlign::Bottom,
            HAlign::Left,
            &OUTLINED_8X10,
        );
    }

    fn horizon(&self, canvas: &mut Canvas, cx: i32, cy: i32, t: &Telemetry) {
        let (sin, cos) = t.roll.to_radians().sin_cos();
        let y = cy + (t.pitch * PITCH_SCALE) as i32;
        let half = self.bounds.width() / 5;
        let gap = 12.;
        for &side in &[-1., 1.] {
            let (x0, y0) = (side * gap * cos, side * gap * sin);
            let (x1, y1) = (side * half as f32 * cos, side * half as f32 * sin);
            canvas.line_outlined(
                cx + x0 as i32,
                y + y0 as i32,
                cx + x1 as i32,
                y + y1 as i32,
                OutlineStyle::BlackOutline,
                Mode::Set,
            );
        }
    }

    fn heading(&self, canvas: &mut Canvas, cx: i32, heading: i32) {
        let mut text = Text::new();
        let _ = write!(text, "{:03}", heading.rem_euclid(360));
        let w = 3 * i32::from(OUTLINED_12X18.width) + 2;
        let h = i32::from(OUTLINED_12X18.height);
        canvas.filled_rectangle(cx - w / 2 - 2, 2, w + 4, h + 4, Pen::BLACK);
        canvas.draw_string(
            &text,
            cx,
            4,
            1,
            0,
            VAlign::Top,
            HAlign::Center,
            &OUTLINED_12X18,
        );
        canvas.draw_box(cx - w / 2 - 3, 1, cx + w / 2 + 3, h + 6, Pen::WHITE);
    }

    fn home(&self, canvas: &mut Canvas, cx: i32, t: &Telemetry) {
        let y = self.bounds.bottom - 40;
        canvas.polygon(
            cx,
            y,
            t.home_bearing,
            &HOME_ARROW,
            OutlineStyle::BlackOutline,
            Mode::Set,
        );
        let mut text = Text::new();
        let _ = write!(text, "{}M", t.home_distance);
        canvas.draw_string(
            &text,
            cx,
            y + 16,
            1,
            0,
            VAlign::Top,
            HAlign::Center,
            &OUTLINED_8X10,
        );
    }
}
