//! The unified grid model (component A).
//!
//! Four parallel row-major arrays sampled at cell centers, plus the
//! structural fields that place them in world space. Grounded in the
//! teacher's `Tilemap<T>` (`tilemap.rs`): same row-major `idx = row*cols+col`
//! addressing and `get`/`get_mut`/`iter` shape, but without `Tilemap`'s
//! horizontal wrap-around (this grid is a bounded rectangle, not an
//! equirectangular planet) and with the four fields fused into one struct
//! rather than four independent `Tilemap` instances, since callers always
//! need them in lockstep.

use crate::error::MapError;

/// Axis-aligned world-space bounds of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn is_degenerate(&self) -> bool {
        self.width().abs() < f64::EPSILON || self.height().abs() < f64::EPSILON
    }
}

/// Owns the four per-cell fields and the structural metadata that locates
/// them in world space. See spec.md §3 for the full invariant list.
#[derive(Debug, Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    pub bounds: Bounds,
    pub heights: Vec<f32>,
    pub biomes: Vec<u8>,
    pub moisture: Vec<u8>,
    pub temperature: Vec<u8>,
}

impl Grid {
    /// Build a grid from raw parallel arrays, as the grid-import adapter
    /// would hand them over after normalizing a third-party format.
    pub fn from_raw(
        rows: usize,
        cols: usize,
        cell_size: f64,
        bounds: Bounds,
        heights: Vec<f32>,
        biomes: Vec<u8>,
        moisture: Vec<u8>,
        temperature: Vec<u8>,
    ) -> Result<Self, MapError> {
        let grid = Grid {
            rows,
            cols,
            cell_size,
            bounds,
            heights,
            biomes,
            moisture,
            temperature,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// A flat grid of the given shape, useful for tests and as a starting
    /// point before an importer or brush fills in real data.
    pub fn flat(rows: usize, cols: usize, cell_size: f64) -> Self {
        let n = rows * cols;
        Grid {
            rows,
            cols,
            cell_size,
            bounds: Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: cols as f64 * cell_size,
                max_y: rows as f64 * cell_size,
            },
            heights: vec![0.0; n],
            biomes: vec![0; n],
            moisture: vec![1; n],
            temperature: vec![1; n],
        }
    }

    pub fn validate(&self) -> Result<(), MapError> {
        let expected = self.rows * self.cols;
        if self.heights.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                found: self.heights.len(),
                field: "heights",
            });
        }
        if self.biomes.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                found: self.biomes.len(),
                field: "biomes",
            });
        }
        if self.moisture.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                found: self.moisture.len(),
                field: "moisture",
            });
        }
        if self.temperature.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                found: self.temperature.len(),
                field: "temperature",
            });
        }
        if self.bounds.is_degenerate() {
            return Err(MapError::DegenerateBounds);
        }
        Ok(())
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn height_at(&self, row: usize, col: usize) -> f32 {
        self.heights[self.index(row, col)]
    }

    /// World-space position of a grid sample (the vertex lattice used by
    /// marching squares, not the cell-center rect).
    pub fn sample_pos(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.bounds.min_x + col as f64 * self.cell_size,
            self.bounds.min_y + row as f64 * self.cell_size,
        )
    }

    /// Top-left corner of the rect drawn for cell (row,col): samples sit at
    /// cell centers, so the drawn rect is the sample shifted by -1/2 cell.
    pub fn cell_rect_origin(&self, row: usize, col: usize) -> (f64, f64) {
        let (x, y) = self.sample_pos(row, col);
        (x - self.cell_size * 0.5, y - self.cell_size * 0.5)
    }

    pub fn height_range(&self) -> (f32, f32) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &h in &self.heights {
            if h < min {
                min = h;
            }
            if h > max {
                max = h;
            }
        }
        (min, max)
    }

    /// Bilinear sample of the height field at fractional grid coordinates
    /// (col, row). Out-of-bounds queries return 0, per spec.md §4.H's
    /// hachure sampling rule.
    pub fn sample_height_bilinear(&self, col: f64, row: f64) -> f32 {
        if col < 0.0 || row < 0.0 || col > (self.cols - 1) as f64 || row > (self.rows - 1) as f64 {
            return 0.0;
        }
        let c0 = col.floor() as usize;
        let r0 = row.floor() as usize;
        let c1 = (c0 + 1).min(self.cols - 1);
        let r1 = (r0 + 1).min(self.rows - 1);
        let fx = (col - c0 as f64) as f32;
        let fy = (row - r0 as f64) as f32;

        let v00 = self.height_at(r0, c0);
        let v10 = self.height_at(r0, c1);
        let v01 = self.height_at(r1, c0);
        let v11 = self.height_at(r1, c1);

        let top = v00 * (1.0 - fx) + v10 * fx;
        let bottom = v01 * (1.0 - fx) + v11 * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Convert a world-space point to fractional (col, row) grid coordinates.
    pub fn world_to_grid(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.bounds.min_x) / self.cell_size,
            (y - self.bounds.min_y) / self.cell_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_grid_validates() {
        let g = Grid::flat(4, 4, 10.0);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn dimension_mismatch_detected() {
        let mut g = Grid::flat(4, 4, 10.0);
        g.heights.pop();
        assert!(matches!(
            g.validate(),
            Err(MapError::DimensionMismatch { field: "heights", .. })
        ));
    }

    #[test]
    fn degenerate_bounds_detected() {
        let mut g = Grid::flat(4, 4, 10.0);
        g.bounds.max_x = g.bounds.min_x;
        assert!(matches!(g.validate(), Err(MapError::DegenerateBounds)));
    }

    #[test]
    fn bilinear_matches_corner_values() {
        let mut g = Grid::flat(2, 2, 1.0);
        g.heights = vec![0.0, 10.0, 20.0, 30.0];
        assert_eq!(g.sample_height_bilinear(0.0, 0.0), 0.0);
        assert_eq!(g.sample_height_bilinear(1.0, 0.0), 10.0);
        assert_eq!(g.sample_height_bilinear(0.5, 0.5), 15.0);
    }

    #[test]
    fn bilinear_out_of_bounds_is_zero() {
        let g = Grid::flat(4, 4, 1.0);
        assert_eq!(g.sample_height_bilinear(-1.0, 0.0), 0.0);
        assert_eq!(g.sample_height_bilinear(0.0, 100.0), 0.0);
    }
}
