//! Droplet-based hydraulic erosion
//!
//! An [`ErosionEngine`] owns the heightfield and a population of droplets.
//! Each tick advances every live droplet by one step, retires the dead ones
//! and tops the population back up. Ticks are grouped into frames; between
//! frames the grid is handed read-only to a [`HeightfieldObserver`].

pub mod droplet;
pub mod hydraulic;
pub mod params;

pub use droplet::{Droplet, RetireReason, StepOutcome, Transfer};
pub use hydraulic::ErosionEngine;
pub use params::{ErosionParams, ErosionPreset};

use serde::Serialize;

use crate::grid::Grid;

/// Statistics from erosion simulation
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErosionStats {
    /// Total material eroded (in height units)
    pub total_eroded: f64,
    /// Total material deposited
    pub total_deposited: f64,
    /// Droplet steps executed
    pub steps_taken: u64,
    /// Droplets created
    pub droplets_spawned: u64,
    /// Droplets retired at maximum lifetime
    pub retired_expired: u64,
    /// Droplets retired for leaving the grid
    pub retired_out_of_bounds: u64,
    /// Droplets retired with a zero velocity
    pub retired_stalled: u64,
    /// Largest single-step erosion
    pub max_erosion: f32,
    /// Largest single-step deposition
    pub max_deposition: f32,
}

impl ErosionStats {
    pub(crate) fn record_transfer(&mut self, transfer: Transfer) {
        match transfer {
            Transfer::None => {}
            Transfer::Eroded(amount) => {
                self.total_eroded += amount as f64;
                self.max_erosion = self.max_erosion.max(amount);
            }
            Transfer::Deposited(amount) => {
                self.total_deposited += amount as f64;
                self.max_deposition = self.max_deposition.max(amount);
            }
        }
    }

    pub(crate) fn record_retirement(&mut self, reason: RetireReason) {
        match reason {
            RetireReason::Expired => self.retired_expired += 1,
            RetireReason::OutOfBounds => self.retired_out_of_bounds += 1,
            RetireReason::Stalled => self.retired_stalled += 1,
        }
    }

    /// Material removed from the grid and not yet put back.
    pub fn net_removed(&self) -> f64 {
        self.total_eroded - self.total_deposited
    }

    pub fn droplets_retired(&self) -> u64 {
        self.retired_expired + self.retired_out_of_bounds + self.retired_stalled
    }
}

/// Summary of one frame's worth of ticks
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Frame index, starting at 0
    pub frame: u64,
    /// Ticks run in this frame
    pub ticks: usize,
    /// Droplet steps executed in this frame
    pub steps: u64,
    /// Live droplets after the frame
    pub live_droplets: usize,
    /// Global budget left after the frame
    pub steps_remaining: u64,
}

/// Receives the heightfield between simulation batches.
///
/// The grid is borrowed immutably: observers may read or copy it (to refresh
/// a mesh, write an image, ...) but never modify it.
pub trait HeightfieldObserver {
    fn on_batch(&mut self, grid: &Grid, report: &BatchReport);
}

impl<F> HeightfieldObserver for F
where
    F: FnMut(&Grid, &BatchReport),
{
    fn on_batch(&mut self, grid: &Grid, report: &BatchReport) {
        self(grid, report)
    }
}
