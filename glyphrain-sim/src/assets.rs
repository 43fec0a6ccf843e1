//! Procedural stand-in assets
//!
//! The real device ships a glyph spritesheet and a fade-gradient image
//! in its asset bundle. The simulator generates deterministic
//! equivalents so it runs with no files on disk: the glyph shapes are
//! pseudo-random blobs, but the sheet geometry and the gradient's
//! opacity ramp match what the atlas builder expects.

use crate::raster::Raster;

/// Glyph cells per spritesheet row
pub const SHEET_COLUMNS: u32 = 13;

/// Avalanche mix, used as a tiny hash for procedural texture
fn mix(mut v: u32) -> u32 {
    v ^= v >> 16;
    v = v.wrapping_mul(0x7feb_352d);
    v ^= v >> 15;
    v = v.wrapping_mul(0x846c_a68b);
    v ^ (v >> 16)
}

/// Generate a spritesheet holding `total_glyphs` distinct glyph cells.
///
/// The sheet is `SHEET_COLUMNS` cells wide (so its pixel width is always
/// a multiple of `glyph_width`) and as tall as needed. Glyphs are drawn
/// white-on-black at 2x2 pixel granularity with a 2-pixel border, which
/// reads as blocky matrix lettering once the fades are applied.
pub fn glyph_sheet(glyph_width: u32, total_glyphs: usize) -> Raster {
    let rows = (total_glyphs as u32).div_ceil(SHEET_COLUMNS);
    let mut sheet = Raster::new(SHEET_COLUMNS * glyph_width, rows * glyph_width, 0);

    for glyph in 0..total_glyphs as u32 {
        let (cell_x, cell_y) = (glyph % SHEET_COLUMNS, glyph / SHEET_COLUMNS);
        for y in 2..glyph_width.saturating_sub(2) {
            for x in 2..glyph_width.saturating_sub(2) {
                let noise = mix(glyph << 16 | (y / 2) << 8 | (x / 2));
                if noise % 5 < 2 {
                    sheet.set_pixel(cell_x * glyph_width + x, cell_y * glyph_width + y, 255);
                }
            }
        }
    }
    sheet
}

/// Generate the horizontal fade gradient.
///
/// Black pixels with an opacity ramp: fully opaque at the left edge,
/// fully transparent at the right. Drawn over a glyph it knocks pixels
/// down to black, more of them the further left it lands. Opacity is
/// dithered because the mask is binary.
pub fn fade_gradient(glyph_width: u32) -> Raster {
    let width = (glyph_width * 4 / 5).max(1);
    let mut pixels = Vec::with_capacity((width * glyph_width) as usize);
    let mut mask = Vec::with_capacity(pixels.capacity());

    let span = (width - 1).max(1);
    for y in 0..glyph_width {
        for x in 0..width {
            let opacity = (width - 1 - x) * 255 / span;
            let dither = mix(y << 8 | x) % 255;
            pixels.push(0);
            mask.push(if dither < opacity { 255 } else { 0 });
        }
    }
    Raster::with_mask(width, glyph_width, pixels, mask)
}
