//! Host graphics abstraction for the glyphrain effect
//!
//! This crate defines the seam between the animation engine and whatever
//! actually puts pixels on glass:
//!
//! - `Surface` / `Graphics` traits for offscreen composition and blitting
//! - `GfxError` for the fatal startup failures (missing assets, bad
//!   dimensions, exhausted bitmap memory)
//! - `GlyphAtlas`, the dense cache of pre-composited (glyph, fade) bitmaps
//!
//! # Architecture
//!
//! The engine never composites on the hot path. At startup the atlas
//! builder layers a fade gradient over every glyph at increasing offsets,
//! producing one bitmap per (glyph, fade) pair. After that the per-frame
//! code only selects cached bitmaps and blits them, so a host only has to
//! provide cheap blits to keep the animation smooth.
//!
//! Hosts implement `Graphics` (bitmap loading and surface allocation) and
//! `Surface` (masked composition) with their platform's graphics API.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod atlas;
pub mod surface;

// Re-export key types
pub use atlas::{GlyphAtlas, FADE_GRADIENT_ASSET, GLYPH_SHEET_ASSET};
pub use surface::{GfxError, Graphics, Shade, Surface};
