//! Scripted crank and button input
//!
//! Plays the role of the handheld's input/timing adapter: it integrates
//! a constant crank rotation rate while the crank is out of its dock and
//! hands the accumulated readings to the engine with the same
//! read-and-reset contract the hardware API has.

use glyphrain_core::{Buttons, FrameClock, InputSource};

/// Deterministic input source for simulator runs
pub struct ScriptedInput {
    docked: bool,
    crank_rate: f32,
    buttons: Buttons,
    pending_elapsed: f32,
    pending_crank: f32,
}

impl ScriptedInput {
    /// Create a docked input turning at `crank_rate` degrees per second
    /// whenever it is undocked.
    pub fn new(crank_rate: f32) -> Self {
        Self {
            docked: true,
            crank_rate,
            buttons: Buttons::NONE,
            pending_elapsed: 0.0,
            pending_crank: 0.0,
        }
    }

    /// Advance the script by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.pending_elapsed += dt;
        if !self.docked {
            self.pending_crank += self.crank_rate * dt;
        }
    }

    /// Dock or undock the crank.
    pub fn set_docked(&mut self, docked: bool) {
        self.docked = docked;
    }

    /// Set the buttons held for subsequent frames.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }
}

impl InputSource for ScriptedInput {
    fn crank_docked(&self) -> bool {
        self.docked
    }

    fn crank_change(&mut self) -> f32 {
        let change = self.pending_crank;
        self.pending_crank = 0.0;
        change
    }

    fn buttons(&self) -> Buttons {
        self.buttons
    }
}

impl FrameClock for ScriptedInput {
    fn elapsed(&mut self) -> f32 {
        let elapsed = self.pending_elapsed;
        self.pending_elapsed = 0.0;
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_resets_on_read() {
        let mut input = ScriptedInput::new(0.0);
        input.tick(0.5);
        input.tick(0.5);
        assert_eq!(input.elapsed(), 1.0);
        assert_eq!(input.elapsed(), 0.0);
    }

    #[test]
    fn test_crank_accumulates_only_undocked() {
        let mut input = ScriptedInput::new(90.0);
        input.tick(1.0);
        assert_eq!(input.crank_change(), 0.0);

        input.set_docked(false);
        input.tick(1.0);
        input.tick(1.0);
        assert_eq!(input.crank_change(), 180.0);
        assert_eq!(input.crank_change(), 0.0);
    }
}
