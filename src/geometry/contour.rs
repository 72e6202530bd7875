//! Contour stitching, Chaikin smoothing and polygon hierarchy (component D).
//!
//! Segment stitching uses a quantized-point hash to find the next segment
//! sharing an endpoint, the same spatial-bucketing idiom the teacher uses
//! for flood fill frontiers in `biome_feathering.rs::compute_distance_field`
//! (a `VecDeque`-driven BFS keyed by coordinates), adapted here to point
//! adjacency instead of cell adjacency.

use std::collections::HashMap;

use super::marching_squares::Segment;
use super::{dist2, Point};

const STITCH_EPSILON: f64 = 0.1;
const HIERARCHY_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    /// Signed area via the shoelace formula. Positive for counter-clockwise
    /// winding in a y-down coordinate system... the sign itself carries no
    /// meaning beyond "consistent", callers only compare magnitudes.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let n = self.points.len();
        let mut sum = 0.0;
        for i in 0..n {
            let (x0, y0) = self.points[i];
            let (x1, y1) = self.points[(i + 1) % n];
            sum += x0 * y1 - x1 * y0;
        }
        sum * 0.5
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(x, y) in &self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        (min_x, min_y, max_x, max_y)
    }

    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        let n = self.points.len();
        let edge_count = if self.closed { n } else { n - 1 };
        let mut total = 0.0;
        for i in 0..edge_count {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            total += dist2(a, b).sqrt();
        }
        total
    }
}

fn quantize(p: Point) -> (i64, i64) {
    (
        (p.0 / STITCH_EPSILON).round() as i64,
        (p.1 / STITCH_EPSILON).round() as i64,
    )
}

/// Greedily chain a segment soup into ordered paths, closing loops whose
/// traversal returns to its own start.
pub fn stitch(segments: &[Segment]) -> Vec<Path> {
    let n = segments.len();
    let mut used = vec![false; n];

    // Index both endpoints of every segment by quantized position.
    let mut index: HashMap<(i64, i64), Vec<(usize, bool)>> = HashMap::new();
    for (i, seg) in segments.iter().enumerate() {
        index.entry(quantize(seg.p0)).or_default().push((i, true));
        index.entry(quantize(seg.p1)).or_default().push((i, false));
    }

    let find_next = |point: Point, used: &[bool], exclude: usize| -> Option<(usize, Point)> {
        let (qx, qy) = quantize(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = index.get(&(qx + dx, qy + dy)) {
                    for &(seg_idx, is_p0) in bucket {
                        if seg_idx == exclude || used[seg_idx] {
                            continue;
                        }
                        let seg = &segments[seg_idx];
                        let endpoint = if is_p0 { seg.p0 } else { seg.p1 };
                        if dist2(endpoint, point) <= STITCH_EPSILON * STITCH_EPSILON {
                            let other = if is_p0 { seg.p1 } else { seg.p0 };
                            return Some((seg_idx, other));
                        }
                    }
                }
            }
        }
        None
    };

    let mut paths = Vec::new();
    for start in 0..n {
        if used[start] {
            continue;
        }
        used[start] = true;
        let seg = &segments[start];
        let mut points = vec![seg.p0, seg.p1];
        let start_point = seg.p0;
        let mut current_end = seg.p1;
        let mut last_used = start;

        loop {
            if dist2(current_end, start_point) <= STITCH_EPSILON * STITCH_EPSILON
                && points.len() > 2
            {
                break;
            }
            match find_next(current_end, &used, last_used) {
                Some((next_idx, next_point)) => {
                    used[next_idx] = true;
                    last_used = next_idx;
                    points.push(next_point);
                    current_end = next_point;
                }
                None => break,
            }
        }

        let closed = dist2(current_end, start_point) <= STITCH_EPSILON * STITCH_EPSILON
            && points.len() > 2;
        if closed {
            points.pop(); // start isn't repeated, per spec.md's ContourPath invariant
        }
        paths.push(Path { points, closed });
    }

    paths
}

/// Chaikin corner-cutting, `iterations` times. Closed paths wrap around;
/// open polylines don't generate a closing segment, and when `clamp_ends` is
/// set the original first/last points are restored after each pass so the
/// polyline's endpoints stay fixed.
pub fn chaikin(points: &[Point], closed: bool, iterations: usize, clamp_ends: bool) -> Vec<Point> {
    let mut current = points.to_vec();
    if current.len() < 3 && !closed {
        return current;
    }
    for _ in 0..iterations {
        if current.len() < 2 {
            break;
        }
        let n = current.len();
        let edge_count = if closed { n } else { n - 1 };
        let mut next = Vec::with_capacity(edge_count * 2);
        for i in 0..edge_count {
            let p0 = current[i];
            let p1 = current[(i + 1) % n];
            let q = (
                p0.0 + 0.25 * (p1.0 - p0.0),
                p0.1 + 0.25 * (p1.1 - p0.1),
            );
            let r = (
                p0.0 + 0.75 * (p1.0 - p0.0),
                p0.1 + 0.75 * (p1.1 - p0.1),
            );
            next.push(q);
            next.push(r);
        }
        if !closed && clamp_ends {
            if let (Some(first), Some(last)) = (current.first().copied(), current.last().copied())
            {
                let len = next.len();
                next[0] = first;
                next[len - 1] = last;
            }
        }
        current = next;
    }
    current
}

/// Point-in-polygon by ray casting, with a boundary epsilon counted inside.
pub fn point_in_polygon(point: Point, polygon: &[Point], eps: f64) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    // Boundary check first.
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        if point_segment_distance(point, a, b) <= eps {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        let intersects = ((yi > point.1) != (yj > point.1))
            && (point.0 < (xj - xi) * (point.1 - yi) / (yj - yi) + xi);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.0 - a.0;
    let aby = b.1 - a.1;
    let len2 = abx * abx + aby * aby;
    if len2 < 1e-12 {
        return dist2(p, a).sqrt();
    }
    let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0);
    let proj = (a.0 + t * abx, a.1 + t * aby);
    dist2(p, proj).sqrt()
}

/// Determine polygon nesting: `parents[i]` is the index of the smallest-area
/// path that fully encloses path `i`, or `-1` if it's a root. Only closed
/// paths participate; open polylines are always roots (`-1`).
pub fn build_hierarchy(paths: &[Path]) -> Vec<i64> {
    let bounds: Vec<(f64, f64, f64, f64)> = paths.iter().map(Path::bounds).collect();
    let areas: Vec<f64> = paths.iter().map(|p| p.area().abs()).collect();

    let mut parents = vec![-1i64; paths.len()];

    for (i, path) in paths.iter().enumerate() {
        if !path.closed || path.points.len() < 3 {
            continue;
        }
        let (amin_x, amin_y, amax_x, amax_y) = bounds[i];

        let mut best: Option<(usize, f64)> = None;
        for (j, candidate) in paths.iter().enumerate() {
            if i == j || !candidate.closed || candidate.points.len() < 3 {
                continue;
            }
            let (bmin_x, bmin_y, bmax_x, bmax_y) = bounds[j];
            if bmin_x > amin_x || bmin_y > amin_y || bmax_x < amax_x || bmax_y < amax_y {
                continue;
            }
            if areas[j] <= areas[i] {
                continue;
            }

            let sample_count = path.points.len().min(3);
            let all_inside = (0..sample_count).all(|k| {
                let idx = k * path.points.len() / sample_count;
                point_in_polygon(path.points[idx], &candidate.points, HIERARCHY_EPSILON)
            });

            if all_inside {
                match best {
                    Some((_, best_area)) if areas[j] >= best_area => {}
                    _ => best = Some((j, areas[j])),
                }
            }
        }

        if let Some((parent_idx, _)) = best {
            parents[i] = parent_idx as i64;
        }
    }

    parents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::marching_squares;

    fn square_mask(rows: usize, cols: usize, x0: usize, y0: usize, size: usize) -> Vec<u8> {
        let mut m = vec![0u8; rows * cols];
        for r in y0..y0 + size {
            for c in x0..x0 + size {
                m[r * cols + c] = 1;
            }
        }
        m
    }

    #[test]
    fn stitch_closes_single_region() {
        let mask = square_mask(10, 10, 3, 3, 4);
        let segs = marching_squares::extract_mask(&mask, 10, 10, (0.0, 0.0), 1.0);
        let paths = stitch(&segs);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
    }

    #[test]
    fn stitch_region_with_hole() {
        let mut mask = square_mask(12, 12, 2, 2, 8);
        // carve a 2x2 hole in the middle
        for r in 5..7 {
            for c in 5..7 {
                mask[r * 12 + c] = 0;
            }
        }
        let segs = marching_squares::extract_mask(&mask, 12, 12, (0.0, 0.0), 1.0);
        let paths = stitch(&segs);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.closed));
    }

    #[test]
    fn chaikin_shrinks_perimeter() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let before = Path {
            points: square.clone(),
            closed: true,
        }
        .perimeter();
        let smoothed = chaikin(&square, true, 2, false);
        let after = Path {
            points: smoothed,
            closed: true,
        }
        .perimeter();
        assert!(after <= before);
    }

    #[test]
    fn chaikin_doubles_vertex_count_per_iteration() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let once = chaikin(&square, true, 1, false);
        assert_eq!(once.len(), square.len() * 2);
        let twice = chaikin(&square, true, 2, false);
        assert_eq!(twice.len(), square.len() * 4);
    }

    #[test]
    fn chaikin_open_preserves_endpoints_when_clamped() {
        let line = vec![(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)];
        let smoothed = chaikin(&line, false, 3, true);
        assert_eq!(*smoothed.first().unwrap(), (0.0, 0.0));
        assert_eq!(*smoothed.last().unwrap(), (10.0, 0.0));
    }

    #[test]
    fn hierarchy_nests_hole_and_island() {
        // outer 10x10, hole 6x6 inside it, island 2x2 inside the hole
        let size = 20;
        let mut mask = square_mask(size, size, 2, 2, 16);
        for r in 6..12 {
            for c in 6..12 {
                mask[r * size + c] = 0;
            }
        }
        for r in 8..10 {
            for c in 8..10 {
                mask[r * size + c] = 1;
            }
        }
        let segs = marching_squares::extract_mask(&mask, size, size, (0.0, 0.0), 1.0);
        let paths = stitch(&segs);
        assert_eq!(paths.len(), 3);
        let parents = build_hierarchy(&paths);
        let roots = parents.iter().filter(|&&p| p == -1).count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn point_in_polygon_basic() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(point_in_polygon((5.0, 5.0), &square, 0.5));
        assert!(!point_in_polygon((50.0, 50.0), &square, 0.5));
        assert!(point_in_polygon((0.0, 5.0), &square, 0.5));
    }
}
