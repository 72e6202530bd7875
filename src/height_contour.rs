//! Height contour and slope-hachure rendering (component H).
//!
//! Twenty evenly spaced threshold levels over the observed height range,
//! each extracted with `geometry::marching_squares::extract_scalar` in
//! scalar mode, plus a perpendicular hachure mark per long-enough segment
//! indicating downslope direction. Grounded in the teacher's
//! `export.rs::spectral_colormap` for the blue->green->yellow->orange->red
//! ramp idiom (reused here as `color::height_contour_color`), and in
//! `tilemap.rs`'s bilinear sampler for the perpendicular probes (adapted to
//! `Grid::sample_height_bilinear`'s out-of-bounds-is-zero convention).

use crate::color::{height_contour_color, Rgb};
use crate::draw::DrawCommand;
use crate::geometry::marching_squares::{self, Segment};
use crate::grid::Grid;

const LEVEL_COUNT: usize = 20;
const HACHURE_SPACING: f64 = 25.0;
const HACHURE_LENGTH: f64 = 4.0;
const MIN_SEGMENT_LENGTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourStyle {
    BlackAndWhite,
    Colored,
}

/// Render all height-contour levels plus slope hachures. Returns an empty
/// vec (not an error) when the height field is flat, per spec.md's
/// FlatHeightField convention.
pub fn render_height_contours(
    grid: &Grid,
    style: ContourStyle,
    contour_alpha: f32,
) -> Vec<DrawCommand> {
    let (min_h, max_h) = grid.height_range();
    if (max_h - min_h) < 0.1 {
        return Vec::new();
    }

    let field: Vec<f64> = grid.heights.iter().map(|&h| h as f64).collect();
    let origin = grid.sample_pos(0, 0);

    let mut cmds = Vec::new();
    for i in 1..=LEVEL_COUNT {
        let t = i as f64 / LEVEL_COUNT as f64;
        let level = min_h as f64 + (max_h - min_h) as f64 * t;
        let segments =
            marching_squares::extract_scalar(&field, grid.rows, grid.cols, level, origin, grid.cell_size);
        if segments.is_empty() {
            continue;
        }

        emit_level_strokes(&mut cmds, &segments, style, contour_alpha, t);
        emit_hachures(&mut cmds, grid, &segments, level, contour_alpha);
    }

    cmds
}

fn emit_level_strokes(
    cmds: &mut Vec<DrawCommand>,
    segments: &[Segment],
    style: ContourStyle,
    contour_alpha: f32,
    normalized_level: f64,
) {
    match style {
        ContourStyle::BlackAndWhite => {
            for seg in segments {
                cmds.push(DrawCommand::Stroke {
                    color: Rgb(0, 0, 0),
                    alpha: contour_alpha,
                    width: 1.5,
                    points: vec![seg.p0, seg.p1],
                    closed: false,
                });
            }
        }
        ContourStyle::Colored => {
            let color = height_contour_color(normalized_level as f32);
            for seg in segments {
                cmds.push(DrawCommand::Stroke {
                    color: Rgb(20, 20, 20),
                    alpha: 0.75 * contour_alpha,
                    width: 2.0,
                    points: vec![seg.p0, seg.p1],
                    closed: false,
                });
                cmds.push(DrawCommand::Stroke {
                    color,
                    alpha: contour_alpha,
                    width: 1.0,
                    points: vec![seg.p0, seg.p1],
                    closed: false,
                });
            }
        }
    }
}

fn emit_hachures(
    cmds: &mut Vec<DrawCommand>,
    grid: &Grid,
    segments: &[Segment],
    threshold: f64,
    contour_alpha: f32,
) {
    for seg in segments {
        let dx = seg.p1.0 - seg.p0.0;
        let dy = seg.p1.1 - seg.p0.1;
        let len = (dx * dx + dy * dy).sqrt();
        if len < MIN_SEGMENT_LENGTH {
            continue;
        }
        let (tx, ty) = (dx / len, dy / len);
        let (nx, ny) = (-ty, tx);

        let mut dist_along = 0.0;
        while dist_along <= len {
            let px = seg.p0.0 + tx * dist_along;
            let py = seg.p0.1 + ty * dist_along;

            let probe_a = sample_perpendicular(grid, (px, py), (nx, ny), 2.0);
            let probe_b = sample_perpendicular(grid, (px, py), (nx, ny), -2.0);

            let direction = if probe_a < threshold && probe_b >= threshold {
                (nx, ny)
            } else if probe_b < threshold && probe_a >= threshold {
                (-nx, -ny)
            } else if probe_a < probe_b {
                (nx, ny)
            } else {
                (-nx, -ny)
            };

            let tip = (
                px + direction.0 * HACHURE_LENGTH,
                py + direction.1 * HACHURE_LENGTH,
            );
            cmds.push(DrawCommand::Stroke {
                color: Rgb(0, 0, 0),
                alpha: 0.875 * contour_alpha,
                width: 1.0,
                points: vec![(px, py), tip],
                closed: false,
            });

            dist_along += HACHURE_SPACING;
        }
    }
}

/// Sample the height field `multiplier*cellSize` along a perpendicular from
/// a world-space point, converting back into fractional grid coordinates.
fn sample_perpendicular(grid: &Grid, origin: (f64, f64), normal: (f64, f64), multiplier: f64) -> f64 {
    let wx = origin.0 + normal.0 * multiplier * grid.cell_size;
    let wy = origin.1 + normal.1 * multiplier * grid.cell_size;
    let (col, row) = grid.world_to_grid(wx, wy);
    grid.sample_height_bilinear(col, row) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_grid_produces_no_contours() {
        let grid = Grid::flat(8, 8, 10.0);
        let cmds = render_height_contours(&grid, ContourStyle::BlackAndWhite, 0.8);
        assert!(cmds.is_empty());
    }

    #[test]
    fn ramp_grid_produces_contours() {
        let mut grid = Grid::flat(16, 16, 10.0);
        for r in 0..16 {
            for c in 0..16 {
                let idx = grid.index(r, c);
                grid.heights[idx] = (c as f32 / 15.0) * 100.0;
            }
        }
        let cmds = render_height_contours(&grid, ContourStyle::BlackAndWhite, 0.8);
        assert!(!cmds.is_empty());
    }

    #[test]
    fn colored_style_emits_outline_and_colored_pair() {
        let mut grid = Grid::flat(16, 16, 10.0);
        for r in 0..16 {
            for c in 0..16 {
                let idx = grid.index(r, c);
                grid.heights[idx] = (c as f32 / 15.0) * 100.0;
            }
        }
        let cmds = render_height_contours(&grid, ContourStyle::Colored, 0.8);
        // every level-stroke pair doubles the count relative to BW mode,
        // before hachures are added; just assert we get a non-trivial count.
        assert!(cmds.len() > 10);
    }
}
