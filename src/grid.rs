//! Dense heightfield storage with bilinear sampling and splatting.
//!
//! Cells are stored row-major (`index = x + y * width`). Integer reads
//! replicate the edge one cell past each border, which is exactly the reach
//! of a bilinear footprint whose floor sits on the last row or column.

use glam::Vec2;

use crate::error::{Error, Result};

/// 5x5 Gaussian kernel used by [`Grid::add_gaussian`], row-major.
#[rustfmt::skip]
const GAUSSIAN_KERNEL_5X5: [f32; 25] = [
    1.0, 4.0, 7.0, 4.0, 1.0,
    4.0, 16.0, 26.0, 16.0, 4.0,
    7.0, 26.0, 41.0, 26.0, 7.0,
    4.0, 16.0, 26.0, 16.0, 4.0,
    1.0, 4.0, 7.0, 4.0, 1.0,
];
const GAUSSIAN_KERNEL_SCALE: f32 = 1.0 / 273.0;

/// Offset used for the central-difference slope estimate.
const GRADIENT_STEP: f32 = 0.01;

/// A 2D scalar heightfield of fixed size.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Grid {
    /// Create a zero-filled grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            data: vec![0.0; width * height],
        })
    }

    /// Wrap an existing row-major buffer.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if data.len() != width * height {
            return Err(Error::DataLength {
                width,
                height,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major cell values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Resolve one axis, pulling `-1` and `len` back onto the border.
    fn clamp_axis(v: isize, len: usize) -> Option<usize> {
        let len = len as isize;
        match v {
            -1 => Some(0),
            v if v == len => Some((len - 1) as usize),
            v if (0..len).contains(&v) => Some(v as usize),
            _ => None,
        }
    }

    /// Read a cell, replicating the edge by one cell on every side.
    /// Returns `None` for coordinates further out than that.
    pub fn checked_get(&self, x: isize, y: isize) -> Option<f32> {
        let cx = Self::clamp_axis(x, self.width)?;
        let cy = Self::clamp_axis(y, self.height)?;
        Some(self.data[cx + cy * self.width])
    }

    /// Read a cell, replicating the edge by one cell on every side.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies more than one cell outside the grid.
    pub fn get(&self, x: isize, y: isize) -> f32 {
        match self.checked_get(x, y) {
            Some(value) => value,
            None => panic!(
                "grid coordinate ({}, {}) is more than one cell outside a {}x{} grid",
                x, y, self.width, self.height
            ),
        }
    }

    /// Overwrite a cell. No clamping.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[x + y * self.width] = value;
    }

    /// Fill the entire grid with a value.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Rebuild every cell from `f(x, y)`, visiting cells in row-major order.
    pub fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize) -> f32,
    {
        let width = self.width;
        for (idx, cell) in self.data.iter_mut().enumerate() {
            *cell = f(idx % width, idx / width);
        }
    }

    /// Iterate over all cells with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        let width = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, &v)| (idx % width, idx / width, v))
    }

    /// Sum of all cells, accumulated in f64.
    pub fn total(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Smallest and largest cell value.
    pub fn min_max(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Sample height at a continuous position using bilinear interpolation.
    ///
    /// Valid for `px` in `[-1, width)` and `py` in `[-1, height)`; the
    /// neighbouring corners are edge-replicated by [`Grid::get`].
    pub fn get_interpolated(&self, px: f32, py: f32) -> f32 {
        let fx = px.floor();
        let fy = py.floor();
        let t = px - fx;
        let k = py - fy;
        let ix = fx as isize;
        let iy = fy as isize;

        self.get(ix, iy) * (1.0 - t) * (1.0 - k)
            + self.get(ix + 1, iy) * t * (1.0 - k)
            + self.get(ix, iy + 1) * (1.0 - t) * k
            + self.get(ix + 1, iy + 1) * t * k
    }

    fn splat_in_bounds(&self, px: f32, py: f32) -> bool {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        (0.0..=max_x).contains(&px) && (0.0..=max_y).contains(&py)
    }

    /// Distribute `amount` over the four corners around `(px, py)` with the
    /// same weights [`Grid::get_interpolated`] reads with. Additive.
    ///
    /// The position must lie in `[0, width-1] x [0, height-1]`. On the far
    /// border the outer corner weight is zero and that corner folds back
    /// onto the border cell, so the full `amount` always lands in the grid.
    pub fn add_interpolated(&mut self, px: f32, py: f32, amount: f32) -> Result<()> {
        if !self.splat_in_bounds(px, py) {
            return Err(Error::SplatOutOfBounds {
                x: px,
                y: py,
                width: self.width,
                height: self.height,
            });
        }

        let fx = px.floor();
        let fy = py.floor();
        let t = px - fx;
        let k = py - fy;
        let x0 = fx as usize;
        let y0 = fy as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let w = self.width;

        self.data[x0 + y0 * w] += amount * (1.0 - t) * (1.0 - k);
        self.data[x1 + y0 * w] += amount * t * (1.0 - k);
        self.data[x0 + y1 * w] += amount * (1.0 - t) * k;
        self.data[x1 + y1 * w] += amount * t * k;
        Ok(())
    }

    /// Spread `amount` through a normalized 5x5 Gaussian centred on
    /// `(cx, cy)`, one bilinear splat per tap.
    ///
    /// Every tap is checked before any cell is written, so a failed call
    /// leaves the grid untouched.
    pub fn add_gaussian(&mut self, cx: f32, cy: f32, amount: f32) -> Result<()> {
        for d in -2..=2 {
            let offset = d as f32;
            if !self.splat_in_bounds(cx + offset, cy + offset) {
                return Err(Error::SplatOutOfBounds {
                    x: cx + offset,
                    y: cy + offset,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        let scaled = amount * GAUSSIAN_KERNEL_SCALE;
        for dy in -2..=2isize {
            for dx in -2..=2isize {
                let weight = GAUSSIAN_KERNEL_5X5[(dx + 2) as usize + (dy + 2) as usize * 5];
                self.add_interpolated(cx + dx as f32, cy + dy as f32, weight * scaled)?;
            }
        }
        Ok(())
    }

    /// Central-difference slope of the interpolated surface at `(px, py)`.
    pub fn calculate_gradient(&self, px: f32, py: f32) -> Vec2 {
        let gx = (self.get_interpolated(px + GRADIENT_STEP, py)
            - self.get_interpolated(px - GRADIENT_STEP, py))
            / (2.0 * GRADIENT_STEP);
        let gy = (self.get_interpolated(px, py + GRADIENT_STEP)
            - self.get_interpolated(px, py - GRADIENT_STEP))
            / (2.0 * GRADIENT_STEP);
        Vec2::new(gx, gy)
    }
}
