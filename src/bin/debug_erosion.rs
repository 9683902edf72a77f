//! Debug tool for comparing erosion presets visually
//! Erodes one heightfield with each preset and tiles the shaded results

use hydro_erosion::erosion::{BatchReport, ErosionEngine, ErosionParams, ErosionPreset};
use hydro_erosion::export::to_relief;
use hydro_erosion::grid::Grid;
use hydro_erosion::heightmap::{build_heightfield, TerrainParams};
use hydro_erosion::noise::NoiseField;
use hydro_erosion::Result;
use image::{imageops, ImageBuffer, Rgb, RgbImage};

const SEED: u64 = 42;
const GUTTER: u32 = 4;
const OUTPUT: &str = "erosion_comparison.png";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    println!("Generating erosion comparison grid...");

    // Generate base terrain once
    let terrain = TerrainParams::default();
    let mut noise = NoiseField::new(SEED);
    let base = build_heightfield(&mut noise, &terrain)?;

    let mut images: Vec<(String, RgbImage)> = vec![("No erosion".to_string(), to_relief(&base))];

    for &preset in ErosionPreset::all() {
        println!("  Processing: {} ({})", preset, preset.description());
        let grid = erode(base.clone(), ErosionParams::from_preset(preset))?;
        images.push((preset.to_string(), to_relief(&grid)));
    }

    let sheet = tile(&images, 2);
    sheet.save(OUTPUT)?;

    println!("Saved {} (left to right, top to bottom):", OUTPUT);
    for (idx, (name, _)) in images.iter().enumerate() {
        println!("  {}. {}", idx + 1, name);
    }
    Ok(())
}

fn erode(grid: Grid, params: ErosionParams) -> Result<Grid> {
    let mut engine = ErosionEngine::new(grid, params, SEED + 1)?;
    let stats = engine.run(&mut |_: &Grid, _: &BatchReport| {})?;
    println!(
        "    eroded {:.3}, deposited {:.3}, max step {:.5}",
        stats.total_eroded, stats.total_deposited, stats.max_erosion
    );
    Ok(engine.into_grid())
}

/// Lay equally sized images out in rows of `cols`, separated by a dark gutter.
fn tile(images: &[(String, RgbImage)], cols: usize) -> RgbImage {
    if images.is_empty() {
        return ImageBuffer::new(1, 1);
    }

    let cell_width = images[0].1.width();
    let cell_height = images[0].1.height();
    let rows = images.len().div_ceil(cols);

    let sheet_width = cols as u32 * (cell_width + GUTTER) + GUTTER;
    let sheet_height = rows as u32 * (cell_height + GUTTER) + GUTTER;
    let mut sheet: RgbImage = ImageBuffer::from_pixel(sheet_width, sheet_height, Rgb([40, 40, 40]));

    for (idx, (_, img)) in images.iter().enumerate() {
        let x = GUTTER + (idx % cols) as u32 * (cell_width + GUTTER);
        let y = GUTTER + (idx / cols) as u32 * (cell_height + GUTTER);
        imageops::replace(&mut sheet, img, x as i64, y as i64);
    }

    sheet
}
