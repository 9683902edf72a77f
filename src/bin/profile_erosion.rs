//! Profiling tool to identify performance bottlenecks

use std::time::{Duration, Instant};

use hydro_erosion::erosion::{BatchReport, ErosionEngine, ErosionParams};
use hydro_erosion::grid::Grid;
use hydro_erosion::heightmap::{build_heightfield, TerrainParams};
use hydro_erosion::noise::NoiseField;
use hydro_erosion::Result;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let terrain = TerrainParams {
        width: 256,
        height: 256,
        ..Default::default()
    };
    let params = ErosionParams::default();
    let seed = 1337u64;

    println!("=== Performance Profiling ===");
    println!(
        "Map size: {}x{} ({} cells)",
        terrain.width,
        terrain.height,
        terrain.width * terrain.height
    );
    println!();

    // Profile heightfield generation
    let mut noise = NoiseField::new(seed);
    let start = Instant::now();
    let grid = build_heightfield(&mut noise, &terrain)?;
    let heightfield_time = start.elapsed();
    println!("Heightfield generation: {:?}", heightfield_time);
    println!("  Lattice gradients: {}", noise.gradient_count());
    println!("  Cached samples: {}", noise.cached_values());

    // Profile erosion (the big one)
    println!("\nErosion parameters:");
    println!("  Step budget: {}", params.step_budget);
    println!("  Target population: {}", params.target_population);
    println!("  Max lifetime: {}", params.max_lifetime);
    println!();

    let mut engine = ErosionEngine::new(grid, params, seed + 1)?;
    let mut observer_time = Duration::ZERO;
    let mut frames = 0u64;
    let start = Instant::now();
    let stats = engine.run(&mut |grid: &Grid, _: &BatchReport| {
        // Stand-in for a renderer copying the grid out each frame
        let copy_start = Instant::now();
        let copy = grid.as_slice().to_vec();
        std::hint::black_box(copy);
        observer_time += copy_start.elapsed();
        frames += 1;
    })?;
    let erosion_time = start.elapsed().saturating_sub(observer_time);
    println!("Erosion simulation: {:?} over {} frames", erosion_time, frames);
    println!("  Steps: {}", stats.steps_taken);
    println!("  Eroded: {:.3} units", stats.total_eroded);
    println!("  Deposited: {:.3} units", stats.total_deposited);
    if stats.steps_taken > 0 {
        println!(
            "  Per step: {:.1} ns",
            erosion_time.as_nanos() as f64 / stats.steps_taken as f64
        );
    }

    // Summary
    let total = heightfield_time + erosion_time + observer_time;
    let pct = |d: Duration| 100.0 * d.as_secs_f64() / total.as_secs_f64().max(f64::EPSILON);
    println!("\n=== Summary ===");
    println!("Heightfield:      {:>8.2}% ({:?})", pct(heightfield_time), heightfield_time);
    println!("Erosion:          {:>8.2}% ({:?})", pct(erosion_time), erosion_time);
    println!("Frame copies:     {:>8.2}% ({:?})", pct(observer_time), observer_time);
    println!("─────────────────────────────────");
    println!("TOTAL:            {:>8}  {:?}", "100%", total);
    Ok(())
}
