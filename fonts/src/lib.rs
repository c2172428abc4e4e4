//! Outlined fonts for the overlay.
//!
//! Both fonts are generated at build time from `glyphs.txt`; the wide one is
//! the same artwork at twice the scale. Every glyph carries a one-pixel black
//! border, so text stays readable over any video content.

#![cfg_attr(not(test), no_std)]

use osd_gfx::{Font, Glyphs};

mod tables {
    include!(concat!(env!("OUT_DIR"), "/outlined_fonts.rs"));
}

/// Small font used for scale labels and general text.
pub static OUTLINED_8X10: Font = Font {
    width: 8,
    height: 10,
    lookup: &tables::LOOKUP,
    glyphs: Glyphs::Narrow(&tables::NARROW_ROWS),
};

/// Large font used for headline values.
pub static OUTLINED_12X18: Font = Font {
    width: 12,
    height: 18,
    lookup: &tables::LOOKUP,
    glyphs: Glyphs::Wide(&tables::WIDE_ROWS),
};

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph_count(font: &Font) -> usize {
        match font.glyphs {
            Glyphs::Narrow(d) => d.len() / usize::from(font.height),
            Glyphs::Wide(d) => d.len() / usize::from(font.height),
        }
    }

    #[test]
    fn lookup_entries_are_in_range() {
        for font in &[&OUTLINED_8X10, &OUTLINED_12X18] {
            let n = glyph_count(font);
            for code in 0..=255u8 {
                if let Some(g) = font.glyph_index(code) {
                    assert!(g < n, "code {} maps to {}", code, g);
                }
            }
        }
    }

    #[test]
    fn lower_case_uses_upper_case_glyphs() {
        for c in b'a'..=b'z' {
            let upper = OUTLINED_8X10.glyph_index(c.to_ascii_uppercase());
            assert!(upper.is_some());
            assert_eq!(OUTLINED_8X10.glyph_index(c), upper);
        }
        assert!(OUTLINED_8X10.glyph_index(b'~').is_none());
    }

    #[test]
    fn border_is_inside_mask() {
        for font in &[&OUTLINED_8X10, &OUTLINED_12X18] {
            for g in 0..glyph_count(font) {
                for row in 0..usize::from(font.height) {
                    let (mask, border) = font.row(g, row).unwrap();
                    assert_eq!(border & !mask, 0, "glyph {} row {}", g, row);
                }
            }
        }
    }

    #[test]
    fn minus_sign_is_outlined() {
        let g = OUTLINED_8X10.glyph_index(b'-').unwrap();
        // Art row 3 lands on cell row 4, columns 1 through 5.
        assert_eq!(OUTLINED_8X10.row(g, 4), Some((0xFE00, 0x8200)));
        assert_eq!(OUTLINED_8X10.row(g, 3), Some((0xFE00, 0xFE00)));
        assert_eq!(OUTLINED_8X10.row(g, 2), Some((0, 0)));

        let g = OUTLINED_12X18.glyph_index(b'-').unwrap();
        // Doubled: rows 7 and 8, columns 1 through 10.
        assert_eq!(OUTLINED_12X18.row(g, 7), Some((0xFFF0, 0x8010)));
        assert_eq!(OUTLINED_12X18.row(g, 6), Some((0xFFF0, 0xFFF0)));
    }

    #[test]
    fn space_is_blank() {
        let g = OUTLINED_12X18.glyph_index(b' ').unwrap();
        for row in 0..18 {
            assert_eq!(OUTLINED_12X18.row(g, row), Some((0, 0)));
        }
    }
}
