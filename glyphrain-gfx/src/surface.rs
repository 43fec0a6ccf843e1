//! Surface and graphics provider traits
//!
//! Defines the interface the host graphics API has to satisfy.

/// Solid shades on a 1-bit display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shade {
    /// All pixels off
    Black,
    /// All pixels on
    White,
}

/// Graphics errors
///
/// Every variant is fatal for the effect: without its font atlas there is
/// nothing to animate, so callers abort startup rather than retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GfxError {
    /// Named bitmap asset missing or unreadable
    AssetMissing,
    /// Surface dimensions incompatible with the requested operation
    BadDimensions,
    /// Bitmap memory exhausted
    AllocationFailed,
}

/// A drawable pixel surface
///
/// Surfaces support masked composition: drawing one surface onto another
/// skips the source's transparent pixels. Offsets may be negative and
/// out-of-bounds regions are clipped, which is how single glyphs are
/// extracted from a spritesheet.
pub trait Surface {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Composite `src` onto this surface with its top-left corner at
    /// (`x`, `y`).
    ///
    /// Transparent source pixels (per the source's mask) leave the
    /// destination untouched. A source without a mask is fully opaque.
    fn draw(&mut self, src: &Self, x: i32, y: i32);

    /// Fill the entire surface with a solid shade, clearing any mask.
    fn fill(&mut self, shade: Shade);
}

/// Host graphics provider
///
/// Abstracts the platform services the effect needs at startup: loading
/// bitmap assets by logical name and allocating offscreen surfaces. The
/// per-frame loop never calls these.
pub trait Graphics {
    /// The surface type this provider produces
    type Surface: Surface;

    /// Load a bitmap asset by logical name.
    ///
    /// Asset names are resolved by the host (file system, flash, baked-in
    /// table). A missing or corrupt asset is `GfxError::AssetMissing`.
    fn load(&mut self, name: &str) -> Result<Self::Surface, GfxError>;

    /// Create a blank surface filled with `shade`.
    fn new_surface(&mut self, width: u32, height: u32, shade: Shade)
        -> Result<Self::Surface, GfxError>;

    /// Deep-copy a surface, mask included.
    fn copy_surface(&mut self, src: &Self::Surface) -> Result<Self::Surface, GfxError>;
}
