use std::fs;
use std::path::PathBuf;

use clap::Parser;

use hydro_erosion::config::SimulationConfig;
use hydro_erosion::erosion::{BatchReport, ErosionEngine, ErosionParams, ErosionPreset};
use hydro_erosion::export::{self, ImageStyle};
use hydro_erosion::grid::Grid;
use hydro_erosion::heightmap::build_heightfield;
use hydro_erosion::noise::NoiseField;
use hydro_erosion::Result;

#[derive(Parser, Debug)]
#[command(name = "hydro_erosion")]
#[command(about = "Carve a fractal noise heightfield with droplet-based hydraulic erosion")]
struct Args {
    /// Load settings from a JSON config (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Width of the heightfield in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the heightfield in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Grid cells per noise lattice cell
    #[arg(long)]
    density: Option<f64>,

    /// Number of noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Erosion preset (replaces the config's erosion section)
    #[arg(long, value_enum)]
    preset: Option<ErosionPreset>,

    /// Total droplet steps to simulate
    #[arg(long)]
    steps: Option<u64>,

    /// Write the uneroded heightfield to this PNG
    #[arg(long)]
    before: Option<PathBuf>,

    /// Write the eroded heightfield to this PNG
    #[arg(long)]
    after: Option<PathBuf>,

    /// Write erosion statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Write intermediate frames as PNGs into this directory
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Keep every Nth frame when writing frames
    #[arg(long, default_value = "1")]
    frame_every: u64,

    /// Save the effective configuration as JSON
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Args {
    /// Merge the config file (if any) with the command-line overrides.
    fn to_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig {
                seed: rand::random(),
                ..Default::default()
            },
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(width) = self.width {
            config.terrain.width = width;
        }
        if let Some(height) = self.height {
            config.terrain.height = height;
        }
        if let Some(density) = self.density {
            config.terrain.density = density;
        }
        if let Some(octaves) = self.octaves {
            config.terrain.octaves = octaves;
        }
        if let Some(preset) = self.preset {
            config.erosion = ErosionParams::from_preset(preset);
        }
        if let Some(steps) = self.steps {
            config.erosion.step_budget = steps;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Observer that writes every Nth frame as a relief PNG.
struct FrameWriter {
    dir: Option<PathBuf>,
    every: u64,
    written: usize,
}

impl FrameWriter {
    fn write(&mut self, grid: &Grid, report: &BatchReport) {
        let Some(dir) = &self.dir else {
            return;
        };
        if report.frame % self.every != 0 {
            return;
        }
        let path = dir.join(format!("frame_{:05}.png", report.frame));
        match export::save_png(grid, &path, ImageStyle::Relief) {
            Ok(()) => self.written += 1,
            Err(e) => log::warn!("Failed to write {}: {}", path.display(), e),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = args.to_config()?;
    let terrain = &config.terrain;

    println!("Eroding terrain with seed: {}", config.seed);
    println!("Map size: {}x{}", terrain.width, terrain.height);
    println!(
        "Noise: density {}, {} octave(s); erosion: {} steps, rate {}",
        terrain.density, terrain.octaves, config.erosion.step_budget, config.erosion.erosion_rate
    );

    if let Some(path) = &args.save_config {
        config.save(path)?;
        println!("Saved config to {}", path.display());
    }

    // Heightfield
    println!("Generating heightfield...");
    let mut noise = NoiseField::new(config.noise_seed());
    let grid = build_heightfield(&mut noise, terrain)?;
    noise.clear_cache();
    let initial_total = grid.total();

    if let Some(path) = &args.before {
        export::save_png(&grid, path, ImageStyle::Grayscale)?;
        println!("Wrote {}", path.display());
    }

    // Erosion
    if let Some(dir) = &args.frames_dir {
        fs::create_dir_all(dir)?;
    }
    let mut frames = FrameWriter {
        dir: args.frames_dir.clone(),
        every: args.frame_every.max(1),
        written: 0,
    };

    println!("Simulating erosion...");
    let mut engine = ErosionEngine::new(grid, config.erosion.clone(), config.erosion_seed())?;
    let budget = engine.steps_remaining().max(1);
    let mut last_percent = 0;
    let stats = engine.run(&mut |grid: &Grid, report: &BatchReport| {
        frames.write(grid, report);

        let done = budget - report.steps_remaining;
        let percent = done * 100 / budget;
        if percent >= last_percent + 10 {
            last_percent = percent - percent % 10;
            println!("  {:>3}% ({} live droplets)", last_percent, report.live_droplets);
        }
    })?;

    let sediment_in_flight = engine.sediment_in_flight();
    let grid = engine.into_grid();
    let (min_h, max_h) = grid.min_max();

    println!("Erosion complete:");
    println!("  Steps: {}", stats.steps_taken);
    println!(
        "  Droplets: {} spawned, {} retired",
        stats.droplets_spawned,
        stats.droplets_retired()
    );
    println!("  Total eroded: {:.4} units", stats.total_eroded);
    println!("  Total deposited: {:.4} units", stats.total_deposited);
    println!("  Max erosion: {:.5} units", stats.max_erosion);
    println!("  Max deposition: {:.5} units", stats.max_deposition);
    println!(
        "  Mass change: {:.5} (sediment still in flight: {:.5})",
        grid.total() - initial_total,
        sediment_in_flight
    );
    println!("Post-erosion height range: {:.3} to {:.3}", min_h, max_h);
    if frames.written > 0 {
        println!("Wrote {} frame(s)", frames.written);
    }

    if let Some(path) = &args.after {
        export::save_png(&grid, path, ImageStyle::Grayscale)?;
        println!("Wrote {}", path.display());
    }

    if let Some(path) = &args.stats {
        fs::write(path, serde_json::to_string_pretty(&stats)?)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
