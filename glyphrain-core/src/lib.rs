//! Host-agnostic animation engine for the glyphrain effect
//!
//! This crate contains all effect logic that does not depend on a
//! specific host platform:
//!
//! - Effect configuration types and validation
//! - Integer-degree sine lookup table
//! - Cell grid state (per-column phase/speed desynchronization)
//! - Speed governor and effect-time integration (crank coupling)
//! - The per-frame update: brightness, fade buckets, glyph cycling,
//!   redraw-only-on-change blits
//! - Input and frame-clock traits the host implements
//!
//! The host owns the frame loop: it registers the engine with its
//! display scheduler and invokes [`Effect::on_frame`] once per refresh
//! tick. Everything runs on that single thread; nothing here blocks.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod engine;
pub mod grid;
pub mod input;
pub mod trig;

// Re-export key types
pub use clock::EffectClock;
pub use config::{ConfigError, EffectConfig};
pub use engine::{Effect, EngineError, FrameStats, RainEngine};
pub use grid::{Cell, CellGrid, NO_FADE};
pub use input::{Buttons, FrameClock, InputSource};
pub use trig::SineTable;
