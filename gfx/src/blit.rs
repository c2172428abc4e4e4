//! Word-level blitters for 16-pixel runs that don't start on a byte boundary.
//!
//! Glyph rows and image rows are stored as words with the leftmost pixel in
//! the MSB. Written at pixel offset `x_offset` (0-7) into byte `index`, such a
//! word touches up to three bytes. Bytes whose share of the word is empty are
//! not accessed at all, and bytes past the end of the plane are skipped.

/// Splits `word`, shifted right by `x_offset` pixels, into the three bytes it
/// can overlap.
#[inline(always)]
fn spread(word: u16, x_offset: usize) -> [u8; 3] {
    debug_assert!(x_offset < 8);
    let w = (u32::from(word) << 8) >> x_offset;
    [(w >> 16) as u8, (w >> 8) as u8, w as u8]
}

#[inline(always)]
fn for_each_byte(
    plane: &mut [u8],
    index: usize,
    mask: [u8; 3],
    mut f: impl FnMut(&mut u8, usize),
) {
    for (i, &m) in mask.iter().enumerate() {
        if m != 0 {
            if let Some(b) = plane.get_mut(index + i) {
                f(b, i);
            }
        }
    }
}

/// Sets every pixel that is set in `word`.
pub fn write_word_or(plane: &mut [u8], word: u16, index: usize, x_offset: usize) {
    let bits = spread(word, x_offset);
    for_each_byte(plane, index, bits, |b, i| *b |= bits[i]);
}

/// Clears every pixel that is set in `word`.
pub fn write_word_nand(plane: &mut [u8], word: u16, index: usize, x_offset: usize) {
    let bits = spread(word, x_offset);
    for_each_byte(plane, index, bits, |b, i| *b &= !bits[i]);
}

/// Copies the pixels of `word` selected by `mask`, leaving the rest alone.
pub fn write_word_masked(
    plane: &mut [u8],
    word: u16,
    mask: u16,
    index: usize,
    x_offset: usize,
) {
    let bits = spread(word, x_offset);
    let mask = spread(mask, x_offset);
    for_each_byte(plane, index, mask, |b, i| {
        *b = (*b & !mask[i]) | (bits[i] & mask[i])
    });
}
