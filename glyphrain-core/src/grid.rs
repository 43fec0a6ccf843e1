//! Cell grid state
//!
//! One cell per grid position, sized to tile the display at the glyph
//! cell width. Cells in the same column share a random phase and speed
//! scale so the columns desynchronize visually; cells never move after
//! creation.

use alloc::vec::Vec;

use rand::Rng;

use crate::config::EffectConfig;

/// Fade sentinel: out of range, so the first frame always draws
pub const NO_FADE: i32 = -1;

/// Animated state of one grid position
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell {
    /// Grid column, in glyph-width units
    pub col: u16,
    /// Grid row, in glyph-width units
    pub row: u16,
    /// Current brightness bucket, or `NO_FADE` before the first draw
    pub fade_index: i32,
    /// Current glyph identity (index into the atlas)
    pub glyph_index: usize,
    /// Progress in [0, 1) toward the next glyph change
    pub glyph_cycle: f32,
    /// Column-shared speed multiplier in [0.5, 1.0]
    pub speed_scale: f32,
    /// Column-shared phase offset
    pub time_offset: f32,
}

/// Fixed-size grid of animated cells
///
/// Dimensions are derived once from the display size and never change
/// for the process lifetime.
pub struct CellGrid {
    cells: Vec<Cell>,
    columns: usize,
    rows: usize,
}

impl CellGrid {
    /// Build the grid for a display of the given pixel size.
    ///
    /// `columns = display_width / glyph_width` and likewise for rows,
    /// floor-divided; a partial trailing column or row is not animated.
    /// Each column draws one time offset (uniform, scaled by 1000) and
    /// one speed scale (uniform in [0.5, 1.0]) shared by its cells.
    pub fn new<R: Rng>(
        config: &EffectConfig,
        display_width: u32,
        display_height: u32,
        rng: &mut R,
    ) -> Self {
        let columns = (display_width / config.glyph_width) as usize;
        let rows = (display_height / config.glyph_width) as usize;

        let mut cells = Vec::with_capacity(columns * rows);
        for col in 0..columns {
            let time_offset = rng.random::<f32>() * 1000.0;
            let speed_scale = rng.random::<f32>() * 0.5 + 0.5;
            for row in 0..rows {
                cells.push(Cell {
                    col: col as u16,
                    row: row as u16,
                    fade_index: NO_FADE,
                    glyph_index: rng.random_range(0..config.standard_glyphs),
                    glyph_cycle: rng.random::<f32>(),
                    speed_scale,
                    time_offset,
                });
            }
        }

        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total cell count
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for displays narrower than one glyph cell
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, column-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable view of all cells
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}
