//! PNG export of a heightfield.
//!
//! Two looks are available: a raw grayscale dump where height `h` maps to
//! `h * 128 + 128`, and a hill-shaded relief normalized to the grid's own
//! range (easier on the eye when comparing runs).

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

use crate::error::Result;
use crate::grid::Grid;

/// How a grid is turned into pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImageStyle {
    /// 8-bit gray, `h * 128 + 128`, clamped
    #[default]
    Grayscale,
    /// Hill-shaded color relief
    Relief,
}

/// Grayscale image with `[-1, 1]` mapped onto `[0, 255]`.
pub fn to_grayscale(grid: &Grid) -> GrayImage {
    ImageBuffer::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        let h = grid.get(x as isize, y as isize);
        Luma([(h * 128.0 + 128.0).clamp(0.0, 255.0) as u8])
    })
}

/// Hill-shaded relief, lit from the upper left.
pub fn to_relief(grid: &Grid) -> RgbImage {
    let (min_h, max_h) = grid.min_max();
    let range = (max_h - min_h).max(1e-6);

    let light = glam::Vec3::new(-0.7, -0.7, 0.5).normalize();
    // Heights live in roughly [-1, 1]; exaggerate so slopes read clearly
    let relief_scale = 8.0;

    ImageBuffer::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        let (xi, yi) = (x as isize, y as isize);
        let h = grid.get(xi, yi);
        let t = (h - min_h) / range;

        let nx = (grid.get(xi - 1, yi) - grid.get(xi + 1, yi)) * relief_scale;
        let ny = (grid.get(xi, yi - 1) - grid.get(xi, yi + 1)) * relief_scale;
        let normal = glam::Vec3::new(nx, ny, 1.0).normalize();
        let lighting = (0.3 + 0.7 * normal.dot(light).max(0.0)).min(1.0);

        let base = if t < 0.4 {
            // Valley floor - green
            [70.0, 130.0, 60.0]
        } else if t < 0.75 {
            // Slopes - green to brown
            let s = (t - 0.4) / 0.35;
            [70.0 + s * 70.0, 130.0 - s * 40.0, 60.0 - s * 10.0]
        } else {
            // Ridges - gray rock
            let s = (t - 0.75) / 0.25;
            [140.0 + s * 60.0, 90.0 + s * 100.0, 50.0 + s * 140.0]
        };

        Rgb([
            (base[0] * lighting) as u8,
            (base[1] * lighting) as u8,
            (base[2] * lighting) as u8,
        ])
    })
}

/// Write the grid to a PNG file.
pub fn save_png<P: AsRef<Path>>(grid: &Grid, path: P, style: ImageStyle) -> Result<()> {
    match style {
        ImageStyle::Grayscale => to_grayscale(grid).save(path)?,
        ImageStyle::Relief => to_relief(grid).save(path)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_grayscale_mapping() {
        let grid = Grid::from_vec(4, 1, vec![-1.0, 0.0, 0.5, 3.0]).unwrap();
        let img = to_grayscale(&grid);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(1, 0)[0], 128);
        assert_eq!(img.get_pixel(2, 0)[0], 192);
        assert_eq!(img.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn test_relief_dimensions_and_flat_shading() {
        let mut grid = Grid::new(5, 3).unwrap();
        grid.fill(0.25);
        let img = to_relief(&grid);
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(0, 0), img.get_pixel(4, 2));
    }

    #[test]
    fn test_save_png_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.png");
        let mut grid = Grid::new(8, 6).unwrap();
        grid.fill_with(|x, y| (x as f32 - y as f32) * 0.1);

        save_png(&grid, &path, ImageStyle::Grayscale).unwrap();
        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded, to_grayscale(&grid));

        let relief_path = dir.path().join("relief.png");
        save_png(&grid, &relief_path, ImageStyle::Relief).unwrap();
        assert_eq!(image::open(&relief_path).unwrap().to_rgb8().dimensions(), (8, 6));
    }
}
