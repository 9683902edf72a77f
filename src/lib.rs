//! Hydraulic erosion library
//!
//! Builds a fractal heightfield from seeded gradient noise and carves it
//! with a population of water droplets. Re-exports modules for use by
//! binaries and tools.

pub mod config;
pub mod erosion;
pub mod error;
pub mod export;
pub mod grid;
pub mod heightmap;
pub mod noise;

pub use error::{Error, Result};
