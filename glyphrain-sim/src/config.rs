//! Effect configuration loading
//!
//! The simulator accepts an optional TOML file overriding individual
//! effect tunables; anything not mentioned keeps its default.
//!
//! ```toml
//! # half-resolution fades, faster glyph churn
//! num_fades = 16
//! cycle_rate = 4.0
//! ```

use std::path::Path;

use anyhow::{Context, Result};

use glyphrain_core::EffectConfig;

/// Load the effect configuration, defaulting when no file is given.
pub fn load(path: Option<&Path>) -> Result<EffectConfig> {
    let Some(path) = path else {
        return Ok(EffectConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EffectConfig =
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
