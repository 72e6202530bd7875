//! Vector river rendering and hit testing (component I).
//!
//! A river is an ordered polyline with a width sample at every vertex;
//! circle-stamping along each segment gives continuous coverage even where
//! width changes sharply. Grounded in the teacher's
//! `erosion/river_geometry.rs` (`RiverControlPoint`, `BezierRiverSegment`
//! with `tangent`/`perpendicular`/`approximate_length` methods) for the
//! overall vertex-with-width shape, simplified from cubic Bezier segments to
//! straight polyline segments per spec.md's VectorRiver.

use crate::color::Rgb;
use crate::draw::DrawCommand;
use crate::geometry::{dist2, Point};

#[derive(Debug, Clone)]
pub struct RiverVertex {
    pub point: Point,
    pub width: f64,
}

#[derive(Debug, Clone)]
pub struct VectorRiver {
    pub id: u64,
    pub name: String,
    pub vertices: Vec<RiverVertex>,
}

#[derive(Debug, Clone, Copy)]
pub struct RiverHit {
    pub segment_index: usize,
    pub t: f64,
    pub projected: Point,
    pub tangent_angle: f64,
    pub interpolated_width: f64,
    pub distance: f64,
}

impl VectorRiver {
    pub fn max_width(&self) -> f64 {
        self.vertices.iter().map(|v| v.width).fold(0.0, f64::max)
    }

    pub fn total_length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| dist2(w[0].point, w[1].point).sqrt())
            .sum()
    }

    /// Render by stamping filled circles along each segment. Stamp count is
    /// `max(1, ceil(length / (min(r_i,r_j)*0.75)))`, radius interpolating
    /// linearly between the segment's endpoint radii.
    pub fn render(&self, color: Rgb, alpha: f32) -> Vec<DrawCommand> {
        let mut cmds = Vec::new();
        for window in self.vertices.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            let length = dist2(a.point, b.point).sqrt();
            let ra = a.width / 2.0;
            let rb = b.width / 2.0;
            let min_r = ra.min(rb).max(1e-6);
            let stamps = ((length / (min_r * 0.75)).ceil() as usize).max(1);

            for s in 0..=stamps {
                let t = s as f64 / stamps as f64;
                let x = a.point.0 + (b.point.0 - a.point.0) * t;
                let y = a.point.1 + (b.point.1 - a.point.1) * t;
                let r = ra + (rb - ra) * t;
                cmds.push(DrawCommand::Circle {
                    color,
                    alpha,
                    center: (x, y),
                    radius: r,
                    filled: true,
                });
            }
        }
        cmds
    }

    /// Nearest-segment hit test. `None` if outside the padded bounding box
    /// or no segment passes the per-segment distance test.
    pub fn hit_test(&self, query: Point) -> Option<RiverHit> {
        let pad = self.max_width() / 2.0 + 10.0;
        let (min_x, min_y, max_x, max_y) = self.bounds();
        if query.0 < min_x - pad
            || query.0 > max_x + pad
            || query.1 < min_y - pad
            || query.1 > max_y + pad
        {
            return None;
        }

        let mut best: Option<RiverHit> = None;
        for (i, window) in self.vertices.windows(2).enumerate() {
            let (a, b) = (&window[0], &window[1]);
            let (t, projected) = project_to_segment(query, a.point, b.point);
            let d2 = dist2(query, projected);
            let w = a.width.max(b.width);
            let threshold = (w / 2.0 + 6.0).powi(2);
            if d2 > threshold {
                continue;
            }
            let width = a.width + (b.width - a.width) * t;
            let tangent_angle = (b.point.1 - a.point.1).atan2(b.point.0 - a.point.0);
            let hit = RiverHit {
                segment_index: i,
                t,
                projected,
                tangent_angle,
                interpolated_width: width,
                distance: d2.sqrt(),
            };
            match &best {
                Some(current) if current.distance <= hit.distance => {}
                _ => best = Some(hit),
            }
        }
        best
    }

    /// Midpoint of the polyline by arc length, for label anchoring.
    pub fn label_anchor(&self) -> Option<Point> {
        let total = self.total_length();
        if total <= 0.0 || self.vertices.len() < 2 {
            return self.vertices.first().map(|v| v.point);
        }
        let half = total / 2.0;
        let mut walked = 0.0;
        for window in self.vertices.windows(2) {
            let (a, b) = (window[0].point, window[1].point);
            let seg_len = dist2(a, b).sqrt();
            if walked + seg_len >= half {
                let t = if seg_len > 0.0 { (half - walked) / seg_len } else { 0.0 };
                return Some((a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t));
            }
            walked += seg_len;
        }
        self.vertices.last().map(|v| v.point)
    }

    /// Tangent angle at the label anchor, normalized per spec.md §4.I: wrap
    /// to `(-pi, pi]`, then fold into `[-pi/2, pi/2]`.
    pub fn label_angle(&self) -> f64 {
        let total = self.total_length();
        let half = total / 2.0;
        let mut walked = 0.0;
        for window in self.vertices.windows(2) {
            let (a, b) = (window[0].point, window[1].point);
            let seg_len = dist2(a, b).sqrt();
            if walked + seg_len >= half || self.vertices.len() == 2 {
                let angle = (b.1 - a.1).atan2(b.0 - a.0);
                return normalize_label_angle(angle);
            }
            walked += seg_len;
        }
        0.0
    }

    fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for v in &self.vertices {
            min_x = min_x.min(v.point.0);
            min_y = min_y.min(v.point.1);
            max_x = max_x.max(v.point.0);
            max_y = max_y.max(v.point.1);
        }
        (min_x, min_y, max_x, max_y)
    }
}

fn project_to_segment(p: Point, a: Point, b: Point) -> (f64, Point) {
    let abx = b.0 - a.0;
    let aby = b.1 - a.1;
    let len2 = abx * abx + aby * aby;
    if len2 < 1e-12 {
        return (0.0, a);
    }
    let t = (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0);
    (t, (a.0 + t * abx, a.1 + t * aby))
}

fn normalize_label_angle(angle: f64) -> f64 {
    let pi = std::f64::consts::PI;
    let mut a = angle;
    while a > pi {
        a -= 2.0 * pi;
    }
    while a <= -pi {
        a += 2.0 * pi;
    }
    if a > pi / 2.0 {
        a -= pi;
    } else if a < -pi / 2.0 {
        a += pi;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_river() -> VectorRiver {
        VectorRiver {
            id: 1,
            name: "Test River".to_string(),
            vertices: vec![
                RiverVertex { point: (0.0, 0.0), width: 4.0 },
                RiverVertex { point: (100.0, 0.0), width: 4.0 },
            ],
        }
    }

    #[test]
    fn hit_test_finds_point_on_river() {
        let river = straight_river();
        let hit = river.hit_test((50.0, 1.0)).expect("should hit");
        assert!((hit.t - 0.5).abs() < 1e-6);
        assert!(hit.distance < 6.0);
    }

    #[test]
    fn hit_test_misses_far_point() {
        let river = straight_river();
        assert!(river.hit_test((50.0, 500.0)).is_none());
    }

    #[test]
    fn render_produces_continuous_stamps() {
        let river = straight_river();
        let cmds = river.render(Rgb(30, 100, 200), 1.0);
        assert!(!cmds.is_empty());
    }

    #[test]
    fn label_angle_never_points_upside_down() {
        // a river running right-to-left (angle near pi) should fold to near 0
        let river = VectorRiver {
            id: 2,
            name: "Reversed".to_string(),
            vertices: vec![
                RiverVertex { point: (100.0, 0.0), width: 4.0 },
                RiverVertex { point: (0.0, 0.0), width: 4.0 },
            ],
        };
        let angle = river.label_angle();
        assert!(angle.abs() <= std::f64::consts::FRAC_PI_2 + 1e-9);
    }

    #[test]
    fn label_anchor_is_polyline_midpoint() {
        let river = straight_river();
        let anchor = river.label_anchor().unwrap();
        assert!((anchor.0 - 50.0).abs() < 1e-6);
    }
}
