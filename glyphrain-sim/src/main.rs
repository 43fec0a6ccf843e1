//! Glyphrain workstation simulator
//!
//! Drives the digital rain engine exactly the way the handheld's frame
//! scheduler would: one `on_frame` per tick at a fixed refresh rate,
//! with crank dock/undock transitions and the bonus-glyph button gesture
//! scripted from the command line.
//!
//! ```bash
//! # 10 seconds of rain, crank undocked for the middle third
//! glyphrain-sim --frames 300 --undock-at 100 --redock-at 200
//!
//! # watch per-frame blit counts
//! RUST_LOG=debug glyphrain-sim --frames 90
//!
//! # reproducible run with a final ASCII dump of the display
//! glyphrain-sim --seed 7 --ascii
//! ```

mod assets;
mod config;
mod input;
mod raster;

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use clap::Parser;
use log::{debug, info};

use glyphrain_core::{Buttons, Effect, RainEngine};
use glyphrain_gfx::{FADE_GRADIENT_ASSET, GLYPH_SHEET_ASSET};

use input::ScriptedInput;
use raster::{Raster, SimGraphics};

/// Luminance ramp for the ASCII dump, dark to bright
const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// Glyphrain simulator
///
/// Runs the digital rain effect against an in-memory framebuffer.
#[derive(Parser)]
#[command(name = "glyphrain-sim")]
#[command(about = "Workstation simulator for the glyphrain effect")]
struct Args {
    /// Display width in pixels
    #[arg(long, default_value_t = 400)]
    width: u32,

    /// Display height in pixels
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Display refresh rate in frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// PRNG seed; defaults to wall-clock seconds
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file overriding effect tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame at which the crank leaves its dock
    #[arg(long)]
    undock_at: Option<u32>,

    /// Frame at which the crank returns to its dock
    #[arg(long)]
    redock_at: Option<u32>,

    /// Crank rotation while undocked, degrees per second
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    crank_rate: f32,

    /// Hold the bonus-glyph button gesture for the whole run
    #[arg(long)]
    bonus: bool,

    /// Pace frames in real time instead of free-running
    #[arg(long)]
    realtime: bool,

    /// Dump the final frame as ASCII art
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let effect_config = config::load(args.config.as_deref())?;
    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };
    info!(
        "{}x{} @ {} fps, seed {seed}, {} glyphs x {} fades",
        args.width,
        args.height,
        args.fps,
        effect_config.total_glyphs(),
        effect_config.num_fades
    );

    let mut gfx = SimGraphics::new();
    gfx.register(
        GLYPH_SHEET_ASSET,
        assets::glyph_sheet(effect_config.glyph_width, effect_config.total_glyphs()),
    );
    gfx.register(
        FADE_GRADIENT_ASSET,
        assets::fade_gradient(effect_config.glyph_width),
    );

    let mut engine = RainEngine::new(&mut gfx, args.width, args.height, effect_config, seed)
        .map_err(|err| anyhow!("engine startup failed: {err:?}"))?;
    info!(
        "grid {}x{} cells, atlas ready",
        engine.grid().columns(),
        engine.grid().rows()
    );

    let mut frame = Raster::new(args.width, args.height, 0);
    engine.on_init(&mut frame);

    let mut input = ScriptedInput::new(args.crank_rate);
    if args.bonus {
        input.set_buttons(Buttons::A | Buttons::B);
    }

    let dt = 1.0 / args.fps as f32;
    let mut total_blits = 0u64;
    for tick in 0..args.frames {
        if args.undock_at == Some(tick) {
            info!("frame {tick}: crank undocked");
            input.set_docked(false);
        }
        if args.redock_at == Some(tick) {
            info!("frame {tick}: crank docked");
            input.set_docked(true);
        }

        input.tick(dt);
        let stats = engine.on_frame(&mut input, &mut frame);
        total_blits += u64::from(stats.blits);
        debug!(
            "frame {tick}: {} blits, {} glyph changes, speed {:.2}, dt {:+.3}",
            stats.blits, stats.glyph_changes, stats.speed, stats.delta
        );

        if args.realtime {
            std::thread::sleep(Duration::from_secs_f32(dt));
        }
    }

    info!(
        "{} frames, {} blits ({:.1} per frame, {} cells)",
        args.frames,
        total_blits,
        total_blits as f64 / args.frames.max(1) as f64,
        engine.grid().len()
    );

    if args.ascii {
        print_ascii(&frame);
    }
    Ok(())
}

/// Downsample the framebuffer to one character per 4x8 pixel block.
fn print_ascii(frame: &Raster) {
    use glyphrain_gfx::Surface;

    let (step_x, step_y) = (4u32, 8u32);
    for by in 0..frame.height() / step_y {
        let mut line = String::with_capacity((frame.width() / step_x) as usize);
        for bx in 0..frame.width() / step_x {
            let mut sum = 0u32;
            for y in 0..step_y {
                for x in 0..step_x {
                    sum += u32::from(frame.pixel(bx * step_x + x, by * step_y + y));
                }
            }
            let mean = sum / (step_x * step_y);
            let index = (mean as usize * (ASCII_RAMP.len() - 1)) / 255;
            line.push(ASCII_RAMP[index] as char);
        }
        println!("{line}");
    }
}
