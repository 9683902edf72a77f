//! Initial terrain synthesis: fractal Brownian motion over a [`NoiseField`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::noise::NoiseField;

// =============================================================================
// TERRAIN PARAMETERS
// =============================================================================

/// Parameters for the initial heightfield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Grid cells per noise lattice cell (higher = larger features)
    pub density: f64,
    /// Number of noise octaves (1 = plain noise)
    pub octaves: u32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            density: 75.0,
            octaves: 3,
        }
    }
}

impl TerrainParams {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(Error::invalid(
                "density",
                format!("must be a positive number, got {}", self.density),
            ));
        }
        if self.octaves == 0 {
            return Err(Error::invalid("octaves", "at least one octave is required"));
        }
        Ok(())
    }
}

// =============================================================================
// FRACTAL SAMPLING
// =============================================================================

/// Sum `octaves` layers of noise at `(nx, ny)`, starting at amplitude 0.5 and
/// frequency 1.0, halving amplitude and doubling frequency per layer.
/// A single octave is the raw noise value.
pub fn fractal_sample(noise: &mut NoiseField, nx: f64, ny: f64, octaves: u32) -> f64 {
    if octaves == 1 {
        return noise.sample(nx, ny);
    }

    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 1.0;
    for _ in 0..octaves {
        value += amplitude * noise.sample(nx * frequency, ny * frequency);
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

/// Build the starting heightfield by sampling fBm at every grid cell.
///
/// Grid coordinates are divided by `density` to reach noise space.
pub fn build_heightfield(noise: &mut NoiseField, params: &TerrainParams) -> Result<Grid> {
    params.validate()?;

    let mut grid = Grid::new(params.width, params.height)?;
    grid.fill_with(|x, y| {
        let nx = x as f64 / params.density;
        let ny = y as f64 / params.density;
        fractal_sample(noise, nx, ny, params.octaves) as f32
    });

    let (min_h, max_h) = grid.min_max();
    log::info!(
        "Built {}x{} heightfield ({} octaves, density {}): range {:.3} to {:.3}, {} gradients",
        params.width,
        params.height,
        params.octaves,
        params.density,
        min_h,
        max_h,
        noise.gradient_count()
    );

    Ok(grid)
}
