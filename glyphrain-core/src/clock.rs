//! Effect clock and speed governor
//!
//! Integrates wall time into effect time. While the crank is docked the
//! speed relaxes up toward its ceiling and time simply flows; while it
//! is out of the dock the speed relaxes down toward its floor and the
//! crank itself scrubs effect time, forward or backward.

use crate::config::EffectConfig;

/// Global animation clock
///
/// `time` is the authoritative driver of all cell brightness phase. It
/// is mutated only by the engine on its single thread, once per tick.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectClock {
    time: f32,
    speed: f32,
    min_speed: f32,
    max_speed: f32,
    step: f32,
    crank_gain: f32,
}

impl EffectClock {
    /// Create a clock at time zero, running at full speed.
    pub fn new(config: &EffectConfig) -> Self {
        Self {
            time: 0.0,
            speed: config.max_speed,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            step: config.speed_step,
            crank_gain: config.crank_gain,
        }
    }

    /// Advance the clock by one tick and return the effect-time delta.
    ///
    /// `elapsed_s` is wall time since the previous tick; `crank_degrees`
    /// is the crank rotation over the same interval (ignored while
    /// docked) and may be negative.
    pub fn advance(&mut self, docked: bool, elapsed_s: f32, crank_degrees: f32) -> f32 {
        if docked {
            self.speed += self.step;
        } else {
            self.speed -= self.step;
        }
        self.speed = self.speed.clamp(self.min_speed, self.max_speed);

        let mut delta = elapsed_s * self.speed;
        if !docked {
            delta += crank_degrees * self.crank_gain / 360.0;
        }
        self.time += delta;
        delta
    }

    /// Accumulated effect time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Current speed, always within the configured bounds
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Rewind to time zero at full speed.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.speed = self.max_speed;
    }
}
