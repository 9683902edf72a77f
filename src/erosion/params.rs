//! Erosion simulation parameters and configuration

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Erosion intensity preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErosionPreset {
    /// Short run - softens the noise slightly
    Light,
    /// Balanced erosion
    #[default]
    Normal,
    /// Aggressive erosion - deep gullies
    Heavy,
}

impl ErosionPreset {
    pub fn all() -> &'static [Self] {
        &[Self::Light, Self::Normal, Self::Heavy]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Light => "Short run, subtle smoothing",
            Self::Normal => "Balanced erosion",
            Self::Heavy => "Fast carving, long run",
        }
    }
}

impl std::fmt::Display for ErosionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Normal => write!(f, "normal"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

/// Droplet erosion parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Steps a droplet lives before it is retired
    pub max_lifetime: u32,

    /// Fraction of the available capacity/height difference moved per step (0.0-1.0]
    pub erosion_rate: f32,

    /// Live droplet count the engine tops up towards
    pub target_population: usize,

    /// Total droplet steps for the whole simulation
    pub step_budget: u64,

    /// Engine ticks run per frame before the grid is handed back
    pub ticks_per_frame: usize,

    /// Velocity damping applied every step [0.0-1.0)
    pub friction: f32,

    /// Exponential decay of sediment capacity with droplet age
    pub capacity_decay: f32,

    /// Transfers at or below this amount are skipped
    pub min_transfer: f32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            max_lifetime: 30,
            erosion_rate: 0.01,
            target_population: 300,
            step_budget: 12_000_000,
            ticks_per_frame: 1000,
            friction: 0.9,
            capacity_decay: 0.1,
            min_transfer: 1e-6,
        }
    }
}

impl ErosionParams {
    /// Create a small configuration for tests and previews
    pub fn fast() -> Self {
        Self {
            target_population: 50,
            step_budget: 100_000,
            ..Default::default()
        }
    }

    /// Create parameters from a preset
    pub fn from_preset(preset: ErosionPreset) -> Self {
        match preset {
            ErosionPreset::Light => Self {
                step_budget: 2_000_000,
                ..Default::default()
            },
            ErosionPreset::Normal => Self::default(),
            ErosionPreset::Heavy => Self {
                erosion_rate: 0.03,
                step_budget: 24_000_000,
                ..Default::default()
            },
        }
    }

    /// Sediment a droplet of the given age can carry.
    pub fn capacity(&self, lifetime: u32) -> f32 {
        (-(lifetime as f32) * self.capacity_decay).exp()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_lifetime == 0 {
            return Err(Error::invalid("max_lifetime", "must be at least 1"));
        }
        if !(self.erosion_rate > 0.0 && self.erosion_rate <= 1.0) {
            return Err(Error::invalid(
                "erosion_rate",
                format!("must be in (0, 1], got {}", self.erosion_rate),
            ));
        }
        if self.target_population == 0 {
            return Err(Error::invalid("target_population", "must be at least 1"));
        }
        if self.ticks_per_frame == 0 {
            return Err(Error::invalid("ticks_per_frame", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(Error::invalid(
                "friction",
                format!("must be in [0, 1), got {}", self.friction),
            ));
        }
        if !self.capacity_decay.is_finite() || self.capacity_decay < 0.0 {
            return Err(Error::invalid(
                "capacity_decay",
                format!("must be a non-negative number, got {}", self.capacity_decay),
            ));
        }
        if self.min_transfer.is_nan() || self.min_transfer < 0.0 {
            return Err(Error::invalid(
                "min_transfer",
                format!("must be non-negative, got {}", self.min_transfer),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ErosionParams::default().validate().is_ok());
        for &preset in ErosionPreset::all() {
            assert!(ErosionParams::from_preset(preset).validate().is_ok(), "{}", preset);
        }
    }

    #[test]
    fn test_capacity_decays_with_age() {
        let params = ErosionParams::default();
        assert_eq!(params.capacity(0), 1.0);
        assert!((params.capacity(10) - (-1.0f32).exp()).abs() < 1e-6);
        assert!(params.capacity(29) < params.capacity(28));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            ErosionParams {
                erosion_rate: 0.0,
                ..Default::default()
            },
            ErosionParams {
                erosion_rate: 1.5,
                ..Default::default()
            },
            ErosionParams {
                max_lifetime: 0,
                ..Default::default()
            },
            ErosionParams {
                target_population: 0,
                ..Default::default()
            },
            ErosionParams {
                ticks_per_frame: 0,
                ..Default::default()
            },
            ErosionParams {
                friction: 1.0,
                ..Default::default()
            },
            ErosionParams {
                capacity_decay: f32::NAN,
                ..Default::default()
            },
            ErosionParams {
                min_transfer: -1.0,
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(matches!(params.validate(), Err(Error::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(ErosionPreset::Heavy.to_string(), "heavy");
        assert_eq!(ErosionParams::from_preset(ErosionPreset::Normal), ErosionParams::default());
    }
}
