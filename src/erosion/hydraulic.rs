//! Hydraulic erosion engine driving a population of water droplets.
//!
//! Droplets are processed one at a time in reverse index order. Their
//! bilinear splats overlap, so stepping them sequentially is what keeps grid
//! mutation deterministic; there is no parallel path.
//!
//! Every executed droplet step draws one unit from a global budget. Once the
//! budget is spent the engine stops, mid-tick if necessary, so a budget of N
//! runs exactly N droplet steps.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::erosion::droplet::{advance, Droplet, StepOutcome};
use crate::erosion::params::ErosionParams;
use crate::erosion::{BatchReport, ErosionStats, HeightfieldObserver};
use crate::error::Result;
use crate::grid::Grid;

/// Owns the heightfield and the droplets eroding it.
pub struct ErosionEngine {
    grid: Grid,
    droplets: Vec<Droplet>,
    params: ErosionParams,
    steps_remaining: u64,
    frames: u64,
    rng: ChaCha8Rng,
    stats: ErosionStats,
}

impl ErosionEngine {
    /// Take ownership of `grid` for the duration of the simulation.
    /// `seed` drives droplet spawn positions and velocities.
    pub fn new(grid: Grid, params: ErosionParams, seed: u64) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            grid,
            droplets: Vec::with_capacity(params.target_population),
            steps_remaining: params.step_budget,
            params,
            frames: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats: ErosionStats::default(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Give the grid back, ending the simulation.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn droplets(&self) -> &[Droplet] {
        &self.droplets
    }

    pub fn params(&self) -> &ErosionParams {
        &self.params
    }

    pub fn stats(&self) -> &ErosionStats {
        &self.stats
    }

    pub fn steps_remaining(&self) -> u64 {
        self.steps_remaining
    }

    /// True once the step budget is spent.
    pub fn is_finished(&self) -> bool {
        self.steps_remaining == 0
    }

    /// Sediment currently carried by live droplets.
    pub fn sediment_in_flight(&self) -> f64 {
        self.droplets.iter().map(|d| d.sediment as f64).sum()
    }

    fn random_velocity(&mut self) -> Vec2 {
        Vec2::new(self.rng.gen_range(-0.5..0.5), self.rng.gen_range(-0.5..0.5))
    }

    /// Spawn a droplet at a uniformly random cell with a random velocity.
    pub fn spawn_droplet(&mut self) {
        let x = self.rng.gen_range(0..self.grid.width()) as f32;
        let y = self.rng.gen_range(0..self.grid.height()) as f32;
        self.spawn_droplet_at(x, y);
    }

    /// Spawn a droplet at a given position with a random velocity.
    pub fn spawn_droplet_at(&mut self, x: f32, y: f32) {
        let velocity = self.random_velocity();
        self.insert_droplet(Droplet::new(x, y, velocity));
    }

    /// Add a fully specified droplet to the population.
    pub fn insert_droplet(&mut self, droplet: Droplet) {
        self.droplets.push(droplet);
        self.stats.droplets_spawned += 1;
    }

    /// Advance the droplet at `index` by one step.
    ///
    /// A retired droplet is reported but left in place; removing it is up to
    /// the caller ([`ErosionEngine::step_queue`] does).
    pub fn step_droplet(&mut self, index: usize) -> Result<StepOutcome> {
        let outcome = advance(&mut self.droplets[index], &mut self.grid, &self.params)?;
        match outcome {
            StepOutcome::Moved(transfer) => {
                self.steps_remaining = self.steps_remaining.saturating_sub(1);
                self.stats.steps_taken += 1;
                self.stats.record_transfer(transfer);
            }
            StepOutcome::Retired(reason) => {
                log::trace!("Droplet {} retired: {:?}", index, reason);
                self.stats.record_retirement(reason);
            }
        }
        Ok(outcome)
    }

    /// One engine tick: step every droplet (newest first), drop the dead
    /// ones and spawn a single replacement if the population is short.
    pub fn step_queue(&mut self) -> Result<()> {
        for i in (0..self.droplets.len()).rev() {
            if self.is_finished() {
                break;
            }
            if let StepOutcome::Retired(_) = self.step_droplet(i)? {
                // Everything past `i` has already been stepped this tick
                self.droplets.swap_remove(i);
            }
        }

        if self.droplets.len() < self.params.target_population && !self.is_finished() {
            self.spawn_droplet();
        }
        Ok(())
    }

    /// Run up to `max_ticks` ticks, stopping early when the budget runs out.
    pub fn run_batch(&mut self, max_ticks: usize) -> Result<BatchReport> {
        let start_steps = self.stats.steps_taken;
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_finished() {
            self.step_queue()?;
            ticks += 1;
        }

        let report = BatchReport {
            frame: self.frames,
            ticks,
            steps: self.stats.steps_taken - start_steps,
            live_droplets: self.droplets.len(),
            steps_remaining: self.steps_remaining,
        };
        self.frames += 1;

        log::debug!(
            "Frame {}: {} ticks, {} steps, {} droplets live, {} steps left",
            report.frame,
            report.ticks,
            report.steps,
            report.live_droplets,
            report.steps_remaining
        );
        Ok(report)
    }

    /// Run frames of `ticks_per_frame` ticks until the budget is spent,
    /// showing the grid to `observer` after each one.
    pub fn run<O: HeightfieldObserver>(&mut self, observer: &mut O) -> Result<ErosionStats> {
        while !self.is_finished() {
            let spawned = self.stats.droplets_spawned;
            let retired = self.stats.droplets_retired();
            let report = self.run_batch(self.params.ticks_per_frame)?;
            observer.on_batch(&self.grid, &report);

            // A frame of spawns or retirements alone still moves the
            // population towards stepping droplets
            let idle = report.steps == 0
                && self.stats.droplets_spawned == spawned
                && self.stats.droplets_retired() == retired;
            if idle {
                log::warn!(
                    "Frame {} made no progress; stopping with {} steps left",
                    report.frame,
                    self.steps_remaining
                );
                break;
            }
        }

        if self.is_finished() {
            log::info!(
                "Step budget exhausted after {} steps: eroded {:.4}, deposited {:.4}",
                self.stats.steps_taken,
                self.stats.total_eroded,
                self.stats.total_deposited
            );
        }
        Ok(self.stats.clone())
    }
}
