//! Per-frame animation engine
//!
//! Each tick advances the effect clock, recomputes every cell's
//! brightness bucket from the closed-form oscillation, cycles glyphs
//! stochastically, and blits only the cells whose appearance changed.
//! Most cells keep their fade bucket and glyph from one tick to the
//! next, so the actual blit count per frame stays far below the cell
//! count.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use glyphrain_gfx::{GfxError, Graphics, GlyphAtlas, Shade, Surface};

use crate::clock::EffectClock;
use crate::config::{ConfigError, EffectConfig};
use crate::grid::CellGrid;
use crate::input::{Buttons, FrameClock, InputSource};
use crate::trig::SineTable;

/// Rejection attempts before a resample gives up and keeps the glyph
const MAX_RESAMPLE_ATTEMPTS: u32 = 8;

/// Errors that can abort engine construction
///
/// There are no per-frame errors: all per-cell math is total and all
/// indices are clamped before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Invalid effect configuration
    Config(ConfigError),
    /// Asset or surface failure while building the atlas
    Gfx(GfxError),
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<GfxError> for EngineError {
    fn from(err: GfxError) -> Self {
        EngineError::Gfx(err)
    }
}

/// Per-frame observability counters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Cells redrawn this frame
    pub blits: u32,
    /// Cells whose glyph cycled this frame
    pub glyph_changes: u32,
    /// Effect-time delta applied this frame
    pub delta: f32,
    /// Speed after this frame's relaxation step
    pub speed: f32,
}

/// Capability interface the host's frame scheduler drives
///
/// The host invokes `on_init` once before the first tick and `on_frame`
/// once per display refresh, never overlapping.
pub trait Effect<S: Surface> {
    /// Prepare the display for the first frame.
    fn on_init(&mut self, frame: &mut S);

    /// Advance the effect by one tick and redraw changed cells.
    fn on_frame<I: InputSource + FrameClock>(&mut self, input: &mut I, frame: &mut S)
        -> FrameStats;
}

/// The digital rain engine
///
/// Owns all mutable effect state (clock, grid, RNG) plus the read-only
/// atlas and trig table. Hosts construct one per process and drive it
/// through the [`Effect`] interface.
pub struct RainEngine<S: Surface> {
    config: EffectConfig,
    atlas: GlyphAtlas<S>,
    grid: CellGrid,
    clock: EffectClock,
    trig: SineTable,
    rng: SmallRng,
    wobble_a: f32,
    wobble_b: f32,
}

impl<S: Surface> core::fmt::Debug for RainEngine<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RainEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> RainEngine<S> {
    /// Build the engine: validate the config, materialize the atlas, and
    /// seed the cell grid.
    ///
    /// `seed` feeds the effect's PRNG; hosts pass wall-clock seconds for
    /// variety, tests pass a constant for reproducibility. Reseeding
    /// happens only here, never per frame.
    pub fn new<G: Graphics<Surface = S>>(
        gfx: &mut G,
        display_width: u32,
        display_height: u32,
        config: EffectConfig,
        seed: u64,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let atlas = GlyphAtlas::build(
            gfx,
            config.glyph_width,
            config.total_glyphs(),
            config.num_fades,
        )?;

        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = CellGrid::new(&config, display_width, display_height, &mut rng);
        let clock = EffectClock::new(&config);

        let wobble_a = libm::sqrtf(2.0) / config.wobble_divisor;
        let wobble_b = libm::sqrtf(5.0) / config.wobble_divisor;

        Ok(Self {
            config,
            atlas,
            grid,
            clock,
            trig: SineTable::new(),
            rng,
            wobble_a,
            wobble_b,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Cell state, for hosts that want to inspect or dump it
    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Clock state (effect time and current speed)
    pub fn clock(&self) -> &EffectClock {
        &self.clock
    }

    /// Run one tick: integrate time, update every cell, blit the dirty
    /// ones onto `frame`.
    pub fn frame<I: InputSource + FrameClock>(
        &mut self,
        input: &mut I,
        frame: &mut S,
    ) -> FrameStats {
        let docked = input.crank_docked();
        let crank = input.crank_change();
        let elapsed = input.elapsed();
        let bonus_held = input.buttons().contains(Buttons::A | Buttons::B);

        let delta = self.clock.advance(docked, elapsed, crank);
        let time = self.clock.time();

        let config = &self.config;
        let bonus_active = bonus_held && config.bonus_glyphs > 0;
        let glyph_width = config.glyph_width as i32;
        let dimmest = config.num_fades as i32 - 1;

        let mut stats = FrameStats {
            delta,
            speed: self.clock.speed(),
            ..Default::default()
        };

        let atlas = &self.atlas;
        let trig = &self.trig;
        let rng = &mut self.rng;
        let (wobble_a, wobble_b) = (self.wobble_a, self.wobble_b);

        for cell in self.grid.cells_mut() {
            let mut dirty = false;

            let cell_time =
                cell.row as f32 * config.row_phase + cell.time_offset + time * cell.speed_scale;
            let fade_index = fade_bucket(trig, wobble_a, wobble_b, cell_time, config.num_fades);
            if cell.fade_index != fade_index {
                cell.fade_index = fade_index;
                dirty = true;
            }

            cell.glyph_cycle += delta * config.cycle_rate;
            if cell.glyph_cycle > 1.0 {
                cell.glyph_cycle %= 1.0;
                cell.glyph_index = next_glyph(rng, config, cell.glyph_index, bonus_active);
                stats.glyph_changes += 1;
                // A glyph change at the dimmest level is invisible; skip
                // the blit and let the next brightening redraw it.
                if fade_index < dimmest {
                    dirty = true;
                }
            }

            if dirty {
                let bitmap = atlas.get(cell.glyph_index, fade_index as usize);
                frame.draw(
                    bitmap,
                    cell.col as i32 * glyph_width,
                    cell.row as i32 * glyph_width,
                );
                stats.blits += 1;
            }
        }

        stats
    }
}

impl<S: Surface> Effect<S> for RainEngine<S> {
    fn on_init(&mut self, frame: &mut S) {
        frame.fill(Shade::Black);
    }

    fn on_frame<I: InputSource + FrameClock>(
        &mut self,
        input: &mut I,
        frame: &mut S,
    ) -> FrameStats {
        self.frame(input, frame)
    }
}

/// Map a cell's phase position to a fade bucket.
///
/// `brightness = 4 * frac(t + 0.3 sin(wa t) + 0.2 sin(wb t))` with a
/// sign-preserving `frac`; the bucket is clamped into
/// `[0, num_fades - 1]`, so the result is total over all finite inputs.
fn fade_bucket(
    trig: &SineTable,
    wobble_a: f32,
    wobble_b: f32,
    cell_time: f32,
    num_fades: usize,
) -> i32 {
    let wobble =
        0.3 * trig.sin_deg(wobble_a * cell_time) + 0.2 * trig.sin_deg(wobble_b * cell_time);
    let brightness = 4.0 * ((cell_time + wobble) % 1.0);
    ((brightness * num_fades as f32) as i32).clamp(0, num_fades as i32 - 1)
}

/// Pick the next glyph for a cell, never repeating the current one.
///
/// Draws from the standard subset, or with 1-in-4 odds from the bonus
/// subset while the gesture is active. Rejection is bounded: a losing
/// draw streak falls back to the neighbouring glyph, which still differs
/// from `current`. When the selectable set has a single member the
/// resample is skipped outright.
fn next_glyph<R: Rng>(
    rng: &mut R,
    config: &EffectConfig,
    current: usize,
    bonus_active: bool,
) -> usize {
    let standard = config.standard_glyphs;
    let bonus = if bonus_active { config.bonus_glyphs } else { 0 };
    if standard + bonus <= 1 {
        return current;
    }

    for _ in 0..MAX_RESAMPLE_ATTEMPTS {
        let candidate = if bonus > 0 && rng.random_range(0..4) == 0 {
            standard + rng.random_range(0..bonus)
        } else {
            rng.random_range(0..standard)
        };
        if candidate != current {
            return candidate;
        }
    }

    if standard > 1 {
        (current + 1) % standard
    } else if current == 0 {
        standard
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 30.0;

    /// Surface double that logs which variant was blitted where
    #[derive(Clone, Debug)]
    struct TestSurface {
        id: u32,
        width: u32,
        height: u32,
        blits: Vec<(u32, i32, i32)>,
    }

    impl Surface for TestSurface {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn draw(&mut self, src: &Self, x: i32, y: i32) {
            self.blits.push((src.id, x, y));
        }

        fn fill(&mut self, _shade: Shade) {
            self.blits.clear();
        }
    }

    /// Graphics double handing out deterministically numbered surfaces
    struct TestGfx {
        next_id: u32,
        sheet_width: u32,
        sheet_height: u32,
        fail_loads: bool,
    }

    impl TestGfx {
        fn for_config(config: &EffectConfig) -> Self {
            // 13 columns is the canonical sheet layout
            let columns = 13u32;
            let rows = (config.total_glyphs() as u32).div_ceil(columns);
            Self {
                next_id: 0,
                sheet_width: columns * config.glyph_width,
                sheet_height: rows * config.glyph_width,
                fail_loads: false,
            }
        }

        fn surface(&mut self, width: u32, height: u32) -> TestSurface {
            let id = self.next_id;
            self.next_id += 1;
            TestSurface {
                id,
                width,
                height,
                blits: Vec::new(),
            }
        }
    }

    impl Graphics for TestGfx {
        type Surface = TestSurface;

        fn load(&mut self, name: &str) -> Result<TestSurface, GfxError> {
            if self.fail_loads {
                return Err(GfxError::AssetMissing);
            }
            match name {
                glyphrain_gfx::GLYPH_SHEET_ASSET => {
                    Ok(self.surface(self.sheet_width, self.sheet_height))
                }
                glyphrain_gfx::FADE_GRADIENT_ASSET => Ok(self.surface(16, 20)),
                _ => Err(GfxError::AssetMissing),
            }
        }

        fn new_surface(
            &mut self,
            width: u32,
            height: u32,
            _shade: Shade,
        ) -> Result<TestSurface, GfxError> {
            Ok(self.surface(width, height))
        }

        fn copy_surface(&mut self, src: &TestSurface) -> Result<TestSurface, GfxError> {
            let mut copy = self.surface(src.width, src.height);
            copy.blits = src.blits.clone();
            Ok(copy)
        }
    }

    /// Scripted crank/button/clock state for one or more ticks
    struct ScriptInput {
        docked: bool,
        crank: f32,
        buttons: Buttons,
        dt: f32,
    }

    impl ScriptInput {
        fn docked(dt: f32) -> Self {
            Self {
                docked: true,
                crank: 0.0,
                buttons: Buttons::NONE,
                dt,
            }
        }
    }

    impl InputSource for ScriptInput {
        fn crank_docked(&self) -> bool {
            self.docked
        }

        fn crank_change(&mut self) -> f32 {
            let change = self.crank;
            self.crank = 0.0;
            change
        }

        fn buttons(&self) -> Buttons {
            self.buttons
        }
    }

    impl FrameClock for ScriptInput {
        fn elapsed(&mut self) -> f32 {
            self.dt
        }
    }

    fn engine(config: EffectConfig, seed: u64) -> RainEngine<TestSurface> {
        let mut gfx = TestGfx::for_config(&config);
        RainEngine::new(&mut gfx, 400, 240, config, seed).unwrap()
    }

    fn frame_surface() -> TestSurface {
        TestSurface {
            id: u32::MAX,
            width: 400,
            height: 240,
            blits: Vec::new(),
        }
    }

    #[test]
    fn test_first_frame_draws_every_cell() {
        let mut engine = engine(EffectConfig::default(), 42);
        let mut frame = frame_surface();
        let stats = engine.frame(&mut ScriptInput::docked(DT), &mut frame);
        assert_eq!(stats.blits, 240);
        assert_eq!(frame.blits.len(), 240);
    }

    #[test]
    fn test_blit_positions_align_to_grid() {
        let mut engine = engine(EffectConfig::default(), 42);
        let mut frame = frame_surface();
        engine.frame(&mut ScriptInput::docked(DT), &mut frame);
        for &(_, x, y) in &frame.blits {
            assert_eq!(x % 20, 0);
            assert_eq!(y % 20, 0);
            assert!((0..400).contains(&x) && (0..240).contains(&y));
        }
    }

    #[test]
    fn test_zero_delta_frame_draws_nothing() {
        let mut engine = engine(EffectConfig::default(), 42);
        let mut frame = frame_surface();
        engine.frame(&mut ScriptInput::docked(DT), &mut frame);

        // No elapsed time, no crank: every cell keeps its fade bucket and
        // glyph, so the dirty policy suppresses every blit.
        let stats = engine.frame(&mut ScriptInput::docked(0.0), &mut frame);
        assert_eq!(stats.blits, 0);
        assert_eq!(stats.glyph_changes, 0);
        assert_eq!(frame.blits.len(), 240);
    }

    #[test]
    fn test_steady_state_redraws_only_changes() {
        let mut engine = engine(EffectConfig::default(), 42);
        let mut frame = frame_surface();
        engine.frame(&mut ScriptInput::docked(DT), &mut frame);
        for _ in 0..30 {
            let stats = engine.frame(&mut ScriptInput::docked(DT), &mut frame);
            assert!(stats.blits < 240, "every cell redrew in a steady frame");
        }
    }

    #[test]
    fn test_fade_indices_stay_in_range() {
        let mut engine = engine(EffectConfig::default(), 99);
        let mut frame = frame_surface();
        for _ in 0..120 {
            engine.frame(&mut ScriptInput::docked(DT), &mut frame);
            assert!(engine
                .grid
                .cells()
                .iter()
                .all(|c| (0..32).contains(&c.fade_index)));
        }
    }

    #[test]
    fn test_deterministic_replay() {
        let run = |seed| {
            let mut engine = engine(EffectConfig::default(), seed);
            let mut frame = frame_surface();
            let mut all_stats = Vec::new();
            for tick in 0..60 {
                let mut input = ScriptInput::docked(DT);
                input.docked = tick < 40;
                all_stats.push(engine.frame(&mut input, &mut frame));
            }
            (frame.blits, all_stats)
        };
        let (blits_a, stats_a) = run(1234);
        let (blits_b, stats_b) = run(1234);
        assert_eq!(blits_a, blits_b);
        assert_eq!(stats_a, stats_b);
        assert!(!blits_a.is_empty());
    }

    #[test]
    fn test_docked_speed_converges_to_max() {
        let mut engine = engine(EffectConfig::default(), 42);
        let mut frame = frame_surface();
        for _ in 0..40 {
            let mut input = ScriptInput::docked(DT);
            input.docked = false;
            engine.frame(&mut input, &mut frame);
        }
        assert_eq!(engine.clock().speed(), 0.15);

        // (1.0 - 0.15) / 0.07 rounds up to 13 docked ticks
        let mut ticks = 0;
        while engine.clock().speed() < 1.0 {
            engine.frame(&mut ScriptInput::docked(DT), &mut frame);
            ticks += 1;
            assert!(ticks <= 13, "speed never converged");
        }
    }

    #[test]
    fn test_cycle_wrap_always_changes_glyph() {
        let config = EffectConfig {
            standard_glyphs: 2,
            bonus_glyphs: 0,
            ..Default::default()
        };
        let mut engine = engine(config, 7);
        let before: Vec<usize> = engine.grid.cells().iter().map(|c| c.glyph_index).collect();

        // delta = 1.0 at full speed pushes every cycle counter past 1
        let mut frame = frame_surface();
        let stats = engine.frame(&mut ScriptInput::docked(1.0), &mut frame);
        assert_eq!(stats.glyph_changes, 240);
        for (cell, old) in engine.grid.cells().iter().zip(before) {
            assert_ne!(cell.glyph_index, old);
            assert!(cell.glyph_index < 2);
        }
    }

    #[test]
    fn test_single_glyph_set_skips_resample() {
        let config = EffectConfig {
            standard_glyphs: 1,
            bonus_glyphs: 0,
            ..Default::default()
        };
        let mut engine = engine(config, 7);
        let mut frame = frame_surface();
        let stats = engine.frame(&mut ScriptInput::docked(1.0), &mut frame);
        assert_eq!(stats.glyph_changes, 240);
        assert!(engine.grid.cells().iter().all(|c| c.glyph_index == 0));
    }

    #[test]
    fn test_bonus_gesture_reaches_bonus_subset() {
        let config = EffectConfig {
            standard_glyphs: 5,
            bonus_glyphs: 5,
            ..Default::default()
        };
        let mut engine = engine(config.clone(), 7);
        let mut frame = frame_surface();
        let mut input = ScriptInput::docked(1.0);
        input.buttons = Buttons::A | Buttons::B;
        for _ in 0..4 {
            input.dt = 1.0;
            engine.frame(&mut input, &mut frame);
        }
        let total = config.total_glyphs();
        assert!(engine.grid.cells().iter().all(|c| c.glyph_index < total));
        assert!(engine
            .grid
            .cells()
            .iter()
            .any(|c| c.glyph_index >= config.standard_glyphs));
    }

    #[test]
    fn test_no_bonus_glyphs_without_gesture() {
        let config = EffectConfig {
            standard_glyphs: 5,
            bonus_glyphs: 5,
            ..Default::default()
        };
        let mut engine = engine(config.clone(), 7);
        let mut frame = frame_surface();
        // A alone is not the gesture
        let mut input = ScriptInput::docked(1.0);
        input.buttons = Buttons::A;
        for _ in 0..4 {
            input.dt = 1.0;
            engine.frame(&mut input, &mut frame);
        }
        assert!(engine
            .grid
            .cells()
            .iter()
            .all(|c| c.glyph_index < config.standard_glyphs));
    }

    #[test]
    fn test_on_init_clears_frame() {
        let mut engine = engine(EffectConfig::default(), 42);
        let mut frame = frame_surface();
        frame.blits.push((0, 0, 0));
        Effect::on_init(&mut engine, &mut frame);
        assert!(frame.blits.is_empty());
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = EffectConfig {
            standard_glyphs: 0,
            ..Default::default()
        };
        let mut gfx = TestGfx::for_config(&config);
        let err = RainEngine::new(&mut gfx, 400, 240, config, 42).unwrap_err();
        assert_eq!(err, EngineError::Config(ConfigError::NoStandardGlyphs));
    }

    #[test]
    fn test_missing_assets_abort_startup() {
        let config = EffectConfig::default();
        let mut gfx = TestGfx::for_config(&config);
        gfx.fail_loads = true;
        let err = RainEngine::new(&mut gfx, 400, 240, config, 42).unwrap_err();
        assert_eq!(err, EngineError::Gfx(GfxError::AssetMissing));
    }

    proptest! {
        #[test]
        fn test_fade_bucket_total_over_finite_inputs(
            cell_time in -1.0e6f32..1.0e6,
            num_fades in 2usize..64,
        ) {
            let trig = SineTable::new();
            let (wa, wb) = (libm::sqrtf(2.0) / 50.0, libm::sqrtf(5.0) / 50.0);
            let bucket = fade_bucket(&trig, wa, wb, cell_time, num_fades);
            prop_assert!((0..num_fades as i32).contains(&bucket));
        }
    }

    proptest! {
        #[test]
        fn test_next_glyph_never_repeats_with_multiple_choices(
            current in 0usize..10,
            seed in any::<u64>(),
        ) {
            let config = EffectConfig {
                standard_glyphs: 10,
                bonus_glyphs: 0,
                ..Default::default()
            };
            let mut rng = SmallRng::seed_from_u64(seed);
            let next = next_glyph(&mut rng, &config, current, false);
            prop_assert!(next != current && next < 10);
        }
    }
}
