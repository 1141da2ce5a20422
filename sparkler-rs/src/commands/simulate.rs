//! Headless burn simulation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use sparkler_sim::ignition::seconds_to_ticks;
use sparkler_sim::{
    BurnClock, BurnState, EmissionLayers, FrameInput, FrameSnapshot, Sparkler, SparklerConfig,
};

use crate::commands::config::load_config;
use crate::utils::{add_table_row, create_progress_bar, create_table};

/// Emission strategy selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layer {
    /// Layered bursts of phase-cascade sparks
    Cascade,
    /// Rate-driven two-stage ballistic sparks
    Ballistic,
    /// One-shot bursts at fixed points along the stick
    BurstPoints,
    /// Every strategy
    All,
}

impl From<Layer> for EmissionLayers {
    fn from(value: Layer) -> Self {
        match value {
            Layer::Cascade => Self::CASCADE,
            Layer::Ballistic => Self::BALLISTIC,
            Layer::BurstPoints => Self::BURST_POINTS,
            Layer::All => Self::all(),
        }
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Frames to simulate
    #[arg(short = 'n', long, default_value_t = 900)]
    pub frames: u64,

    /// Frames per second
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Seconds for burn progress to go from 0 to 1 (defaults to the
    /// configured erosion burn duration)
    #[arg(long)]
    pub burn_seconds: Option<f32>,

    /// Random seed (overrides the configuration file)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emission layers, comma separated (overrides the configuration file)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub layers: Vec<Layer>,

    /// Report every this many frames
    #[arg(long, default_value_t = 60)]
    pub every: u64,

    /// Print one JSON object per report line instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write the final full snapshot as JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// One line of the simulation report
#[derive(Debug, Serialize)]
struct FrameReport {
    frame: u64,
    time: f32,
    state: BurnState,
    burn_progress: f32,
    average_height: f32,
    fully_burned: bool,
    primaries: usize,
    cascades: usize,
    particles: usize,
    visible: usize,
    light: Option<f32>,
    points_fired: usize,
}

impl FrameReport {
    fn new(snapshot: &FrameSnapshot, time: f32) -> Self {
        Self {
            frame: snapshot.frame,
            time,
            state: snapshot.state,
            burn_progress: snapshot.burn_progress,
            average_height: snapshot.average_height,
            fully_burned: snapshot.fully_burned,
            primaries: snapshot.primary_count,
            cascades: snapshot.cascade_count,
            particles: snapshot.total_particles,
            visible: snapshot.sparks.len(),
            light: snapshot.light.map(|light| light.intensity),
            points_fired: snapshot.points_fired,
        }
    }
}

/// Configuration after applying command-line overrides
fn resolve_config(args: &SimulateArgs) -> Result<SparklerConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SparklerConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(seconds) = args.burn_seconds {
        config.erosion.burn_duration = seconds;
    }
    if !args.layers.is_empty() {
        config.emission.layers = args
            .layers
            .iter()
            .fold(EmissionLayers::empty(), |acc, &layer| acc | layer.into());
    }
    Ok(config)
}

pub fn execute(args: SimulateArgs, quiet: bool) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        anyhow::bail!("--fps must be positive, got {}", args.fps);
    }
    if let Some(seconds) = args.burn_seconds
        && !(seconds.is_finite() && seconds > 0.0)
    {
        anyhow::bail!("--burn-seconds must be positive, got {seconds}");
    }
    let every = args.every.max(1);

    let config = resolve_config(&args)?;
    let clock = BurnClock {
        duration_ticks: seconds_to_ticks(config.erosion.burn_duration).max(1) as u32,
        max_progress: config.erosion.max_progress,
        ..BurnClock::default()
    };
    let mut sparkler = Sparkler::new(config).context("Failed to create sparkler")?;
    log::info!(
        "Simulating {} frames at {} fps with seed {}",
        args.frames,
        args.fps,
        sparkler.config().seed
    );

    let dt = 1.0 / args.fps;
    let lit_at = Some(1);

    let mut table = create_table(vec![
        "Frame", "Time", "State", "Progress", "Height", "Primaries", "Cascades", "Particles",
        "Light",
    ]);
    let progress = (!quiet && !args.json).then(|| create_progress_bar(args.frames, "Burning"));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for frame in 1..=args.frames {
        let time = frame as f32 * dt;
        let tick = 1 + seconds_to_ticks(time);
        let input = FrameInput::burning(dt, clock.burn_progress(lit_at, tick))
            .with_fade(clock.fade_factor(lit_at, tick));
        sparkler.simulate_frame(input);

        if frame % every == 0 || frame == args.frames {
            let report = FrameReport::new(&sparkler.snapshot(), time);
            if args.json {
                serde_json::to_writer(&mut out, &report)?;
                writeln!(out)?;
            } else {
                add_table_row(
                    &mut table,
                    vec![
                        report.frame.to_string(),
                        format!("{:.2}s", report.time),
                        format!("{:?}", report.state),
                        format!("{:.3}", report.burn_progress),
                        format!("{:.3}", report.average_height),
                        report.primaries.to_string(),
                        report.cascades.to_string(),
                        report.particles.to_string(),
                        report
                            .light
                            .map_or_else(|| "-".to_string(), |l| format!("{l:.2}")),
                    ],
                );
            }
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    if !args.json && !quiet {
        table.print(&mut out)?;
    }
    out.flush()?;

    if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &sparkler.snapshot())?;
        writer.flush()?;
        log::info!("Wrote final snapshot to {}", path.display());
    }

    Ok(())
}
