#![deny(unsafe_code)]
//! CLI binary for the plexus backdrop.
//!
//! Subcommands:
//! - `render` run a recipe headlessly, write the last frame as PNG
//! - `sequence` write every frame of a run as numbered PNGs
//! - `stats` run on a recording surface and report particle/link counts
//! - `params` print the parameter schema and defaults

mod error;
mod input;

use clap::{Parser, Subcommand};
use error::CliError;
use input::{ensure_drawable, RunArgs};
use plexus_core::{
    AnimationDriver, Backdrop, BackdropConfig, BackdropError, FrameHost, FramePacer, FrameStats,
    HostEvent, Recipe, RecordingSurface, ScriptedHost, Srgb,
};
use plexus_raster::snapshot::write_png;
use plexus_raster::Raster;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "plexus", about = "Drifting particle backdrop with proximity links")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a recipe and write its final frame as PNG.
    Render {
        #[command(flatten)]
        run: RunArgs,

        /// Output file path.
        #[arg(short, long, default_value = "plexus.png")]
        output: PathBuf,
    },
    /// Run a recipe and write every frame as a numbered PNG.
    Sequence {
        #[command(flatten)]
        run: RunArgs,

        /// Output directory (created if missing).
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,

        /// Pace frames at this rate instead of running flat out.
        #[arg(long)]
        fps: Option<f64>,
    },
    /// Run a recipe without rasterizing and report per-frame statistics.
    Stats {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the backdrop parameter schema and defaults.
    Params,
}

/// Writes each presented frame to `dir/frame_NNNNN.png`.
struct SequenceHost {
    script: ScriptedHost,
    dir: PathBuf,
    background: Srgb,
    written: u64,
}

impl FrameHost<Raster> for SequenceHost {
    fn next_event(&mut self) -> HostEvent {
        <ScriptedHost as FrameHost<Raster>>::next_event(&mut self.script)
    }

    fn present(&mut self, surface: &Raster, stats: &FrameStats) -> Result<(), BackdropError> {
        if surface.width() == 0 || surface.height() == 0 {
            warn!(frame = stats.frame, "skipping empty frame");
            return Ok(());
        }
        let path = self.dir.join(format!("frame_{:05}.png", stats.frame));
        write_png(surface, self.background, &path)?;
        self.written += 1;
        Ok(())
    }
}

/// Aggregate counts over a run.
#[derive(Debug, Default, Serialize, PartialEq)]
struct RunStats {
    frames: u64,
    seed: u64,
    width: u32,
    height: u32,
    particles: usize,
    generation: u64,
    resizes: u64,
    links_min: usize,
    links_max: usize,
    links_mean: f64,
}

/// Folds [`FrameStats`] into link min/max/total.
struct StatsHost {
    script: ScriptedHost,
    links_min: usize,
    links_max: usize,
    links_total: u64,
}

impl StatsHost {
    fn new(script: ScriptedHost) -> Self {
        Self {
            script,
            links_min: usize::MAX,
            links_max: 0,
            links_total: 0,
        }
    }
}

impl FrameHost<RecordingSurface> for StatsHost {
    fn next_event(&mut self) -> HostEvent {
        <ScriptedHost as FrameHost<RecordingSurface>>::next_event(&mut self.script)
    }

    fn present(
        &mut self,
        _surface: &RecordingSurface,
        stats: &FrameStats,
    ) -> Result<(), BackdropError> {
        self.links_min = self.links_min.min(stats.links);
        self.links_max = self.links_max.max(stats.links);
        self.links_total += stats.links as u64;
        Ok(())
    }
}

fn collect_stats(recipe: &Recipe) -> Result<RunStats, CliError> {
    let mut backdrop = recipe.backdrop()?;
    let mut surface = RecordingSurface::new(0, 0);
    let mut host = StatsHost::new(recipe.host());
    let frames = AnimationDriver::new().run(&mut backdrop, &mut surface, &mut host)?;

    let dims = backdrop.dimensions();
    Ok(RunStats {
        frames,
        seed: recipe.seed,
        width: dims.width as u32,
        height: dims.height as u32,
        particles: backdrop.particles().len(),
        generation: backdrop.field().generation(),
        resizes: backdrop.controller().resizes(),
        links_min: if frames == 0 { 0 } else { host.links_min },
        links_max: host.links_max,
        links_mean: if frames == 0 {
            0.0
        } else {
            host.links_total as f64 / frames as f64
        },
    })
}

fn run_raster(
    recipe: &Recipe,
    backdrop: &mut Backdrop,
    host: &mut dyn FrameHost<Raster>,
) -> Result<(Raster, u64), CliError> {
    let mut raster = Raster::new(0, 0)?;
    let frames = AnimationDriver::new().run(backdrop, &mut raster, host)?;
    info!(seed = recipe.seed, frames, "run complete");
    Ok((raster, frames))
}

fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Params => {
            let schema = BackdropConfig::param_schema();
            let defaults = BackdropConfig::default().params();
            if cli.json {
                print_json(&serde_json::json!({"schema": schema, "defaults": defaults}))?;
            } else if let Some(entries) = schema.as_object() {
                for (name, entry) in entries {
                    let description = entry["description"].as_str().unwrap_or("");
                    println!("{name:<18} default {:<12} {description}", defaults[name]);
                }
            }
        }
        Command::Render { run, output } => {
            let recipe = run.recipe()?;
            ensure_drawable(&recipe, true)?;
            let mut backdrop = recipe.backdrop()?;
            let (raster, frames) = run_raster(&recipe, &mut backdrop, &mut recipe.host())?;
            write_png(&raster, backdrop.config().background, &output)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "width": raster.width(),
                    "height": raster.height(),
                    "frames": frames,
                    "seed": recipe.seed,
                    "particles": backdrop.particles().len(),
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "rendered {}x{} ({frames} frames, {} particles, seed {}) -> {}",
                    raster.width(),
                    raster.height(),
                    backdrop.particles().len(),
                    recipe.seed,
                    output.display()
                );
            }
        }
        Command::Sequence { run, output, fps } => {
            let recipe = run.recipe()?;
            ensure_drawable(&recipe, false)?;
            let pacer = match fps {
                Some(rate) => Some(FramePacer::new(rate).ok_or_else(|| {
                    CliError::Input(format!("--fps must be positive, got {rate}"))
                })?),
                None => None,
            };
            fs::create_dir_all(&output)
                .map_err(|e| CliError::Io(format!("{}: {e}", output.display())))?;

            let mut backdrop = recipe.backdrop()?;
            let mut host = SequenceHost {
                script: recipe.host().with_pacer(pacer),
                dir: output.clone(),
                background: backdrop.config().background,
                written: 0,
            };
            let (_, frames) = run_raster(&recipe, &mut backdrop, &mut host)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "frames": frames,
                    "written": host.written,
                    "seed": recipe.seed,
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "wrote {} of {frames} frames (seed {}) -> {}",
                    host.written,
                    recipe.seed,
                    output.display()
                );
            }
        }
        Command::Stats { run } => {
            let recipe = run.recipe()?;
            let stats = collect_stats(&recipe)?;
            if cli.json {
                print_json(&stats)?;
            } else {
                println!("frames      {}", stats.frames);
                println!("surface     {}x{}", stats.width, stats.height);
                println!("particles   {}", stats.particles);
                println!("generation  {}", stats.generation);
                println!("resizes     {}", stats.resizes);
                println!(
                    "links       min {} / mean {:.1} / max {}",
                    stats.links_min, stats.links_mean, stats.links_max
                );
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
