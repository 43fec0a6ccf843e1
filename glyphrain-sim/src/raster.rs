//! In-memory raster surfaces
//!
//! The simulator's stand-in for the handheld's bitmap type: an 8-bit
//! luminance buffer with an optional per-pixel mask. Masked pixels are
//! transparent when the raster is drawn onto another surface, which is
//! all the compositing the atlas builder needs.

use std::collections::HashMap;

use log::error;

use glyphrain_gfx::{GfxError, Graphics, Shade, Surface};

/// An owned pixel buffer
#[derive(Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    /// Row-major luminance, 0 = black
    pixels: Vec<u8>,
    /// Row-major opacity, 0 = transparent; `None` means fully opaque
    mask: Option<Vec<u8>>,
}

impl Raster {
    /// Create an opaque raster filled with `value`.
    pub fn new(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; (width * height) as usize],
            mask: None,
        }
    }

    /// Create a raster with an explicit mask.
    ///
    /// # Panics
    /// Panics if the buffer lengths do not match the dimensions.
    pub fn with_mask(width: u32, height: u32, pixels: Vec<u8>, mask: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), (width * height) as usize);
        assert_eq!(mask.len(), pixels.len());
        Self {
            width,
            height,
            pixels,
            mask: Some(mask),
        }
    }

    /// Luminance at (`x`, `y`), or 0 outside the raster
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            0
        }
    }

    /// Set the luminance at (`x`, `y`); out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = value;
        }
    }
}

impl Surface for Raster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw(&mut self, src: &Self, x: i32, y: i32) {
        for sy in 0..src.height as i32 {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width as i32 {
                let dx = x + sx;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let si = (sy * src.width as i32 + sx) as usize;
                if src.mask.as_ref().is_some_and(|m| m[si] == 0) {
                    continue;
                }
                let di = (dy * self.width as i32 + dx) as usize;
                self.pixels[di] = src.pixels[si];
            }
        }
    }

    fn fill(&mut self, shade: Shade) {
        let value = match shade {
            Shade::Black => 0,
            Shade::White => 255,
        };
        self.pixels.fill(value);
        self.mask = None;
    }
}

/// Host graphics provider backed by a named-asset table
#[derive(Default)]
pub struct SimGraphics {
    assets: HashMap<String, Raster>,
}

impl SimGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a raster under a logical asset name.
    pub fn register(&mut self, name: &str, image: Raster) {
        self.assets.insert(name.to_owned(), image);
    }
}

impl Graphics for SimGraphics {
    type Surface = Raster;

    fn load(&mut self, name: &str) -> Result<Raster, GfxError> {
        self.assets.get(name).cloned().ok_or_else(|| {
            error!("asset not found: {name}");
            GfxError::AssetMissing
        })
    }

    fn new_surface(&mut self, width: u32, height: u32, shade: Shade) -> Result<Raster, GfxError> {
        let value = match shade {
            Shade::Black => 0,
            Shade::White => 255,
        };
        Ok(Raster::new(width, height, value))
    }

    fn copy_surface(&mut self, src: &Raster) -> Result<Raster, GfxError> {
        Ok(src.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_clips_at_edges() {
        let mut dst = Raster::new(4, 4, 0);
        let src = Raster::new(3, 3, 9);
        dst.draw(&src, -2, -2);
        assert_eq!(dst.pixel(0, 0), 9);
        assert_eq!(dst.pixel(1, 1), 0);
        dst.draw(&src, 3, 3);
        assert_eq!(dst.pixel(3, 3), 9);
        assert_eq!(dst.pixel(2, 2), 0);
    }

    #[test]
    fn test_draw_skips_masked_pixels() {
        let mut dst = Raster::new(2, 1, 7);
        let src = Raster::with_mask(2, 1, vec![1, 2], vec![0, 255]);
        dst.draw(&src, 0, 0);
        assert_eq!(dst.pixel(0, 0), 7);
        assert_eq!(dst.pixel(1, 0), 2);
    }

    #[test]
    fn test_fill_clears_mask() {
        let mut raster = Raster::with_mask(2, 1, vec![1, 2], vec![0, 0]);
        raster.fill(Shade::White);
        let mut dst = Raster::new(2, 1, 0);
        dst.draw(&raster, 0, 0);
        assert_eq!(dst.pixel(0, 0), 255);
        assert_eq!(dst.pixel(1, 0), 255);
    }

    #[test]
    fn test_missing_asset_reports_error() {
        let mut gfx = SimGraphics::new();
        assert!(matches!(gfx.load("nope"), Err(GfxError::AssetMissing)));
    }
}
