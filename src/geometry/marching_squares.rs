//! Marching squares contour extraction (component C).
//!
//! Pure function over a field sampled on a `rows x cols` lattice; no
//! allocation beyond the emitted segments, matching spec.md's Θ(rows·cols)
//! budget. Grounded in the teacher's flood-fill/BFS grid-scanning style
//! (`water_bodies.rs`, `climate.rs::generate_moisture`) for the row-major
//! double loop, though the case table itself has no direct analogue in the
//! pack — it is the classic marching-squares table specified by spec.md §4.C.

use super::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p0: Point,
    pub p1: Point,
    pub row: usize,
    pub col: usize,
}

/// Edge identifiers around a cell: Top (v00-v10), Right (v10-v11),
/// Bottom (v01-v11), Left (v00-v01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Standard marching-squares case table: bit1=v00 (top-left), bit2=v10
/// (top-right), bit4=v11 (bottom-right), bit8=v01 (bottom-left). Cases 5 and
/// 10 are saddles and split into two segments per spec.md §4.C.
fn case_edges(case: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match case {
        0 | 15 => &[],
        1 => &[(Left, Top)],
        2 => &[(Top, Right)],
        3 => &[(Left, Right)],
        4 => &[(Right, Bottom)],
        5 => &[(Left, Top), (Right, Bottom)],
        6 => &[(Top, Bottom)],
        7 => &[(Left, Bottom)],
        8 => &[(Left, Bottom)],
        9 => &[(Top, Bottom)],
        10 => &[(Top, Right), (Left, Bottom)],
        11 => &[(Right, Bottom)],
        12 => &[(Left, Right)],
        13 => &[(Top, Right)],
        14 => &[(Left, Top)],
        _ => unreachable!("case is a 4-bit value"),
    }
}

/// Interpolate the crossing point on an edge between corner values `v1`,
/// `v2` at threshold `t`. If `force_midpoint` is set (binary-mask mode) or
/// the values are nearly equal, the midpoint is used instead.
fn crossing_fraction(v1: f64, v2: f64, threshold: f64, force_midpoint: bool) -> f64 {
    if force_midpoint || (v2 - v1).abs() < 1e-4 {
        return 0.5;
    }
    (threshold - v1) / (v2 - v1)
}

struct Cell {
    v00: f64,
    v10: f64,
    v11: f64,
    v01: f64,
}

fn edge_point(cell: &Cell, edge: Edge, threshold: f64, force_midpoint: bool, x0: f64, y0: f64, cs: f64) -> Point {
    match edge {
        Edge::Top => {
            let t = crossing_fraction(cell.v00, cell.v10, threshold, force_midpoint);
            (x0 + t * cs, y0)
        }
        Edge::Right => {
            let t = crossing_fraction(cell.v10, cell.v11, threshold, force_midpoint);
            (x0 + cs, y0 + t * cs)
        }
        Edge::Bottom => {
            let t = crossing_fraction(cell.v01, cell.v11, threshold, force_midpoint);
            (x0 + t * cs, y0 + cs)
        }
        Edge::Left => {
            let t = crossing_fraction(cell.v00, cell.v01, threshold, force_midpoint);
            (x0, y0 + t * cs)
        }
    }
}

fn extract_generic(
    field: &[f64],
    rows: usize,
    cols: usize,
    threshold: f64,
    origin: Point,
    cell_size: f64,
    force_midpoint: bool,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    if rows < 2 || cols < 2 {
        return segments;
    }

    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            let v00 = field[row * cols + col];
            let v10 = field[row * cols + col + 1];
            let v11 = field[(row + 1) * cols + col + 1];
            let v01 = field[(row + 1) * cols + col];

            let mut case = 0u8;
            if v00 >= threshold {
                case |= 1;
            }
            if v10 >= threshold {
                case |= 2;
            }
            if v11 >= threshold {
                case |= 4;
            }
            if v01 >= threshold {
                case |= 8;
            }

            let pairs = case_edges(case);
            if pairs.is_empty() {
                continue;
            }

            let cell = Cell { v00, v10, v11, v01 };
            let x0 = origin.0 + col as f64 * cell_size;
            let y0 = origin.1 + row as f64 * cell_size;

            for &(a, b) in pairs {
                let p0 = edge_point(&cell, a, threshold, force_midpoint, x0, y0, cell_size);
                let p1 = edge_point(&cell, b, threshold, force_midpoint, x0, y0, cell_size);
                segments.push(Segment { p0, p1, row, col });
            }
        }
    }

    segments
}

/// Extract contour segments from a scalar field (e.g. heights), with
/// bilinear-on-edge interpolation of the crossing point.
pub fn extract_scalar(
    field: &[f64],
    rows: usize,
    cols: usize,
    threshold: f64,
    origin: Point,
    cell_size: f64,
) -> Vec<Segment> {
    extract_generic(field, rows, cols, threshold, origin, cell_size, false)
}

/// Extract contour segments from a binary mask (0/1 values). Edge crossings
/// always collapse to the cell midpoint.
pub fn extract_mask(
    mask: &[u8],
    rows: usize,
    cols: usize,
    origin: Point,
    cell_size: f64,
) -> Vec<Segment> {
    let field: Vec<f64> = mask.iter().map(|&v| v as f64).collect();
    extract_generic(&field, rows, cols, 0.5, origin, cell_size, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_cells_emit_nothing() {
        let field = vec![0u8; 9];
        let segs = extract_mask(&field, 3, 3, (0.0, 0.0), 1.0);
        assert!(segs.is_empty());

        let field = vec![1u8; 9];
        let segs = extract_mask(&field, 3, 3, (0.0, 0.0), 1.0);
        assert!(segs.is_empty());
    }

    #[test]
    fn mixed_cell_emits_segment() {
        // top row above threshold, bottom row below: single horizontal split
        let mask = vec![1u8, 1, 0, 0];
        let segs = extract_mask(&mask, 2, 2, (0.0, 0.0), 1.0);
        assert_eq!(segs.len(), 1);
    }

    #[test]
    fn scalar_interpolates_crossing() {
        // v00=0, v10=10, threshold=5 -> crossing at t=0.5 along top edge
        let field = vec![0.0, 10.0, 10.0, 10.0];
        let segs = extract_scalar(&field, 2, 2, 5.0, (0.0, 0.0), 10.0);
        assert_eq!(segs.len(), 1);
        let seg = segs[0];
        let on_top = (seg.p0.1 - 0.0).abs() < 1e-9 || (seg.p1.1 - 0.0).abs() < 1e-9;
        assert!(on_top);
    }

    #[test]
    fn saddle_case_emits_two_segments() {
        // case 5: v00 and v11 above threshold, v10 and v01 below
        let mask = vec![1u8, 0, 0, 1];
        let segs = extract_mask(&mask, 2, 2, (0.0, 0.0), 1.0);
        assert_eq!(segs.len(), 2);
    }
}
