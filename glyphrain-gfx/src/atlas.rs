//! Glyph/fade atlas builder
//!
//! Materializes one pre-composited bitmap per (glyph, fade) pair so the
//! per-frame engine only ever selects and blits.

use alloc::vec::Vec;

use crate::surface::{GfxError, Graphics, Shade, Surface};

/// Logical asset name of the glyph spritesheet
pub const GLYPH_SHEET_ASSET: &str = "images/matrix-glyphs";

/// Logical asset name of the horizontal fade gradient
pub const FADE_GRADIENT_ASSET: &str = "images/fade-gradient";

/// Dense cache of pre-composited (glyph, fade) bitmaps
///
/// Built once at startup and read-only afterwards. Entry `(i, j)` is
/// glyph `i` with the fade gradient layered at the offset for fade level
/// `j`; the highest fade level is the dimmest variant.
pub struct GlyphAtlas<S: Surface> {
    /// Variants in `glyph * num_fades + fade` order
    variants: Vec<S>,
    num_glyphs: usize,
    num_fades: usize,
}

impl<S: Surface> core::fmt::Debug for GlyphAtlas<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("num_glyphs", &self.num_glyphs)
            .field("num_fades", &self.num_fades)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> GlyphAtlas<S> {
    /// Build the atlas from the host's glyph spritesheet and fade gradient.
    ///
    /// The spritesheet is a grid of `glyph_width`-square cells read
    /// left-to-right, top-to-bottom. The gradient is a horizontal ramp no
    /// wider than a glyph cell; fade level `j` composites it at x offset
    /// `j / (num_fades - 1) * (glyph_width - gradient_width)`.
    ///
    /// Both source images are dropped once the variants are built.
    ///
    /// # Errors
    /// - `AssetMissing` if either asset fails to load
    /// - `BadDimensions` if the spritesheet width is not a multiple of
    ///   `glyph_width`, the sheet holds fewer than `num_glyphs` cells, or
    ///   the gradient is wider than a glyph cell
    /// - `AllocationFailed` if the variant cache cannot be allocated
    pub fn build<G: Graphics<Surface = S>>(
        gfx: &mut G,
        glyph_width: u32,
        num_glyphs: usize,
        num_fades: usize,
    ) -> Result<Self, GfxError> {
        if glyph_width == 0 || num_glyphs == 0 || num_fades < 2 {
            return Err(GfxError::BadDimensions);
        }

        let sheet = gfx.load(GLYPH_SHEET_ASSET)?;
        let gradient = gfx.load(FADE_GRADIENT_ASSET)?;

        if sheet.width() % glyph_width != 0 {
            return Err(GfxError::BadDimensions);
        }
        let sheet_columns = (sheet.width() / glyph_width) as usize;
        let sheet_rows = (sheet.height() / glyph_width) as usize;
        if sheet_columns == 0 || sheet_columns * sheet_rows < num_glyphs {
            return Err(GfxError::BadDimensions);
        }
        if gradient.width() > glyph_width {
            return Err(GfxError::BadDimensions);
        }

        let mut variants = Vec::new();
        variants
            .try_reserve_exact(num_glyphs * num_fades)
            .map_err(|_| GfxError::AllocationFailed)?;

        let gradient_span = (glyph_width - gradient.width()) as f32;
        let mut scratch = gfx.new_surface(glyph_width, glyph_width, Shade::Black)?;

        for i in 0..num_glyphs {
            let column = (i % sheet_columns) as i32;
            let row = (i / sheet_columns) as i32;

            // Isolate glyph i: blit the whole sheet at a negative offset so
            // only this cell lands inside the scratch surface.
            scratch.fill(Shade::Black);
            scratch.draw(
                &sheet,
                -column * glyph_width as i32,
                -row * glyph_width as i32,
            );

            for j in 0..num_fades {
                let fade = j as f32 / (num_fades - 1) as f32;
                let mut variant = gfx.copy_surface(&scratch)?;
                variant.draw(&gradient, (fade * gradient_span) as i32, 0);
                variants.push(variant);
            }
        }

        Ok(Self {
            variants,
            num_glyphs,
            num_fades,
        })
    }

    /// Look up the variant for `glyph` at `fade`.
    ///
    /// # Panics
    /// Panics if either index is out of range; callers clamp before use.
    pub fn get(&self, glyph: usize, fade: usize) -> &S {
        debug_assert!(glyph < self.num_glyphs && fade < self.num_fades);
        &self.variants[glyph * self.num_fades + fade]
    }

    /// Total number of cached variants
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// True if the atlas holds no variants
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of glyphs covered
    pub fn num_glyphs(&self) -> usize {
        self.num_glyphs
    }

    /// Number of fade levels per glyph
    pub fn num_fades(&self) -> usize {
        self.num_fades
    }
}
