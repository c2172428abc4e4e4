//! Turns the ASCII-art glyph sheet into outlined font tables.

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

const ART_WIDTH: usize = 5;
const ART_HEIGHT: usize = 7;
const NO_GLYPH: u8 = 255;

struct Glyph {
    code: u8,
    pixels: [[bool; ART_WIDTH]; ART_HEIGHT],
}

/// Cell geometry of one generated font.
struct Cell {
    width: usize,
    height: usize,
    scale: usize,
    /// Width of the row bitmap field; the leftmost pixel is its top bit.
    field: usize,
}

const NARROW: Cell = Cell {
    width: 8,
    height: 10,
    scale: 1,
    field: 8,
};

const WIDE: Cell = Cell {
    width: 12,
    height: 18,
    scale: 2,
    field: 16,
};

fn main() {
    let sheet = fs::read_to_string("glyphs.txt").unwrap();
    let glyphs = parse(&sheet);
    assert!(glyphs.len() < usize::from(NO_GLYPH), "too many glyphs");

    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap())
        .join("outlined_fonts.rs");
    let mut f = BufWriter::new(File::create(out).unwrap());
    write_lookup(&mut f, &glyphs).unwrap();
    write_rows(&mut f, "NARROW_ROWS", "u16", &glyphs, &NARROW).unwrap();
    write_rows(&mut f, "WIDE_ROWS", "u32", &glyphs, &WIDE).unwrap();

    println!("cargo:rerun-if-changed=glyphs.txt");
}

fn parse(sheet: &str) -> Vec<Glyph> {
    let mut lines = sheet
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty() && !l.starts_with(';'));

    let mut glyphs = vec![];
    while let Some(header) = lines.next() {
        let name = match header.strip_prefix(':') {
            Some(name) => name,
            None => panic!("expected glyph header, found {:?}", header),
        };
        let code = match name {
            "space" => b' ',
            s if s.len() == 1 => s.as_bytes()[0],
            s => panic!("bad glyph name {:?}", s),
        };

        let mut pixels = [[false; ART_WIDTH]; ART_HEIGHT];
        for row in pixels.iter_mut() {
            let line = lines
                .next()
                .unwrap_or_else(|| panic!("glyph {:?} is truncated", name));
            assert_eq!(line.len(), ART_WIDTH, "glyph {:?}: {:?}", name, line);
            for (px, c) in row.iter_mut().zip(line.bytes()) {
                *px = match c {
                    b'#' => true,
                    b'.' => false,
                    _ => panic!("glyph {:?}: bad pixel {:?}", name, c as char),
                };
            }
        }
        glyphs.push(Glyph { code, pixels });
    }
    glyphs
}

/// Renders `g` into `cell`, returning `(mask, border)` bitmaps per row. The
/// border is every pixel touching the glyph (8-neighbour) that isn't part of
/// it; the mask covers glyph and border.
fn render(g: &Glyph, cell: &Cell) -> Vec<(u32, u32)> {
    let mut lit = vec![vec![false; cell.width]; cell.height];
    for y in 0..ART_HEIGHT * cell.scale {
        for x in 0..ART_WIDTH * cell.scale {
            if g.pixels[y / cell.scale][x / cell.scale] {
                lit[y + 1][x + 1] = true;
            }
        }
    }

    let is_lit = |x: isize, y: isize| {
        x >= 0
            && y >= 0
            && (x as usize) < cell.width
            && (y as usize) < cell.height
            && lit[y as usize][x as usize]
    };

    (0..cell.height)
        .map(|y| {
            let (mut mask, mut border) = (0, 0);
            for x in 0..cell.width {
                let (xi, yi) = (x as isize, y as isize);
                let touching = (-1..=1)
                    .any(|dy| (-1..=1).any(|dx| is_lit(xi + dx, yi + dy)));
                let bit = (1u32 << (cell.field - 1)) >> x;
                if touching {
                    mask |= bit;
                    if !lit[y][x] {
                        border |= bit;
                    }
                }
            }
            (mask, border)
        })
        .collect()
}

fn write_lookup(f: &mut impl Write, glyphs: &[Glyph]) -> io::Result<()> {
    let mut lookup = [NO_GLYPH; 256];
    for (i, g) in glyphs.iter().enumerate() {
        lookup[usize::from(g.code)] = i as u8;
    }
    for c in b'a'..=b'z' {
        if lookup[usize::from(c)] == NO_GLYPH {
            lookup[usize::from(c)] = lookup[usize::from(c.to_ascii_uppercase())];
        }
    }

    writeln!(f, "pub static LOOKUP: [u8; 256] = [")?;
    for chunk in lookup.chunks(16) {
        let entries: Vec<String> = chunk.iter().map(u8::to_string).collect();
        writeln!(f, "    {},", entries.join(", "))?;
    }
    writeln!(f, "];")
}

fn write_rows(
    f: &mut impl Write,
    name: &str,
    ty: &str,
    glyphs: &[Glyph],
    cell: &Cell,
) -> io::Result<()> {
    writeln!(
        f,
        "pub static {}: [{}; {}] = [",
        name,
        ty,
        glyphs.len() * cell.height
    )?;
    for g in glyphs {
        let rows: Vec<String> = render(g, cell)
            .into_iter()
            .map(|(mask, border)| format!("{:#x}", border << cell.field | mask))
            .collect();
        writeln!(f, "    // {:?}", g.code as char)?;
        writeln!(f, "    {},", rows.join(", "))?;
    }
    writeln!(f, "];")
}
