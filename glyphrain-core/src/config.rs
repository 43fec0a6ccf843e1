//! Effect configuration types
//!
//! All tunables in one place. `Default` yields the values the effect
//! ships with; hosts may override individual fields before constructing
//! the engine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration errors detected before the engine is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Glyph cell width must be non-zero
    ZeroGlyphWidth,
    /// At least two fade levels are required
    TooFewFades,
    /// The standard glyph subset must be non-empty
    NoStandardGlyphs,
    /// Speed bounds must satisfy 0 < min <= max
    BadSpeedRange,
}

/// Effect tunables
///
/// The wobble frequencies themselves are not stored here: they are
/// derived as sqrt(2) and sqrt(5) over `wobble_divisor`, two
/// incommensurate values so the brightness wave never exactly repeats.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectConfig {
    /// Square glyph cell width in pixels
    pub glyph_width: u32,
    /// Number of discrete brightness buckets
    pub num_fades: usize,
    /// Glyphs in the standard subset
    pub standard_glyphs: usize,
    /// Glyphs in the bonus subset, appended after the standard subset
    pub bonus_glyphs: usize,
    /// Speed floor while the crank is out of its dock
    pub min_speed: f32,
    /// Speed ceiling while the crank is docked
    pub max_speed: f32,
    /// Per-tick speed relaxation increment
    pub speed_step: f32,
    /// Effect-time gained per full crank revolution
    pub crank_gain: f32,
    /// Per-row phase offset (negative: drops appear to fall)
    pub row_phase: f32,
    /// Glyph cycle progress per unit of effect time
    pub cycle_rate: f32,
    /// Divisor applied to the sqrt(2)/sqrt(5) wobble frequencies
    pub wobble_divisor: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            glyph_width: 20,
            num_fades: 32,
            standard_glyphs: 135,
            bonus_glyphs: 10,
            min_speed: 0.15,
            max_speed: 1.0,
            speed_step: 0.07,
            crank_gain: 5.0,
            row_phase: -0.03,
            cycle_rate: 2.0,
            wobble_divisor: 50.0,
        }
    }
}

impl EffectConfig {
    /// Total glyph count across both subsets
    pub fn total_glyphs(&self) -> usize {
        self.standard_glyphs + self.bonus_glyphs
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.glyph_width == 0 {
            return Err(ConfigError::ZeroGlyphWidth);
        }
        if self.num_fades < 2 {
            return Err(ConfigError::TooFewFades);
        }
        if self.standard_glyphs == 0 {
            return Err(ConfigError::NoStandardGlyphs);
        }
        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed) {
            return Err(ConfigError::BadSpeedRange);
        }
        Ok(())
    }
}
