//! Simulation configuration stored as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::erosion::ErosionParams;
use crate::error::Result;
use crate::heightmap::TerrainParams;

/// Everything needed to reproduce a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Master seed; noise uses it directly, droplets use `seed + 1`
    pub seed: u64,
    pub terrain: TerrainParams,
    pub erosion: ErosionParams,
}

impl SimulationConfig {
    /// Read a config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        self.erosion.validate()
    }

    pub fn noise_seed(&self) -> u64 {
        self.seed
    }

    pub fn erosion_seed(&self) -> u64 {
        self.seed.wrapping_add(1)
    }
}
