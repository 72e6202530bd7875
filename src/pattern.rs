//! Decorative fill pattern generation (component G).
//!
//! Produces primitive draw calls clipped to a biome's polygon mask. The
//! generators themselves are closed-form per spec.md §4.G; the deterministic
//! "spots" pattern reuses the teacher's habit of seeding small per-feature
//! PRNGs from an id (see `coastline.rs`'s jittered-midpoint subdivision,
//! which perturbs a deterministic curve from a stored seed) rather than a
//! global `rand::thread_rng`, since spot placement must reproduce identically
//! across renders for the same biome id.

use crate::biome_resolver::{PatternConfig, PatternType};
use crate::color::Rgb;
use crate::draw::DrawCommand;
use crate::geometry::Point;

/// A tiny linear congruential generator, matching spec.md's literal
/// constants. Not a general-purpose PRNG: it exists solely so "spots"
/// reproduces bit-for-bit given the same biome id.
struct Lcg {
    state: u32,
}

impl Lcg {
    fn new(seed: u32) -> Self {
        Lcg { state: seed }
    }

    fn next_raw(&mut self) -> u32 {
        self.state = (self.state.wrapping_mul(9301).wrapping_add(49297)) % 233280;
        self.state
    }

    /// Uniform float in [0, 1).
    fn next_f64(&mut self) -> f64 {
        self.next_raw() as f64 / 233280.0
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy)]
pub struct BiomeBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Generate the clipped draw commands for one biome's pattern. `centroid`
/// and `farthest_vertex_dist` are precomputed from the biome's smoothed
/// contour vertices by the caller (needed by `circles`).
pub fn generate_pattern(
    pattern: &PatternConfig,
    bounds: BiomeBounds,
    cell_size: f64,
    base_color: Rgb,
    biome_id: u8,
    centroid: Point,
    farthest_vertex_dist: f64,
) -> Vec<DrawCommand> {
    let color = pattern.pattern_color.unwrap_or_else(|| base_color.darken(pattern.darken_factor));
    let spacing = pattern.spacing as f64 * cell_size;
    let line_width = pattern.line_width as f64 * cell_size;

    match pattern.kind {
        PatternType::None => Vec::new(),
        PatternType::Diagonal => diagonal_lines(bounds, spacing, color, pattern.opacity, std::f64::consts::FRAC_PI_4),
        PatternType::Crosshatch => {
            let mut cmds = diagonal_lines(bounds, spacing, color, pattern.opacity, std::f64::consts::FRAC_PI_4);
            cmds.extend(diagonal_lines(bounds, spacing, color, pattern.opacity, -std::f64::consts::FRAC_PI_4));
            cmds
        }
        PatternType::Vertical => axis_lines(bounds, spacing, color, pattern.opacity, true),
        PatternType::Horizontal => axis_lines(bounds, spacing, color, pattern.opacity, false),
        PatternType::Dots => dots(bounds, spacing, line_width, color, pattern.opacity),
        PatternType::Circles => circles(centroid, farthest_vertex_dist, spacing, color, pattern.opacity),
        PatternType::Waves => waves(bounds, spacing, cell_size, color, pattern.opacity),
        PatternType::Hexagons => hexagons(bounds, spacing, color, pattern.opacity),
        PatternType::Spots => spots(bounds, spacing, line_width, color, pattern.opacity, biome_id),
    }
}

fn diagonal_lines(bounds: BiomeBounds, spacing: f64, color: Rgb, opacity: f32, angle: f64) -> Vec<DrawCommand> {
    // Lines at angle `angle`, spaced `spacing` apart along the perpendicular,
    // long enough to span the diagonal of bounds, clamped by caller masking.
    let mut cmds = Vec::new();
    if spacing <= 0.0 {
        return cmds;
    }
    let w = bounds.max_x - bounds.min_x;
    let h = bounds.max_y - bounds.min_y;
    let diag = (w * w + h * h).sqrt();
    let (dx, dy) = (angle.cos(), angle.sin());
    let (nx, ny) = (-dy, dx);
    let cx = (bounds.min_x + bounds.max_x) * 0.5;
    let cy = (bounds.min_y + bounds.max_y) * 0.5;
    let half_lines = (diag / spacing).ceil() as i64;
    for k in -half_lines..=half_lines {
        let offset = k as f64 * spacing;
        let ox = cx + nx * offset;
        let oy = cy + ny * offset;
        let p0 = (ox - dx * diag, oy - dy * diag);
        let p1 = (ox + dx * diag, oy + dy * diag);
        cmds.push(DrawCommand::Stroke {
            color,
            alpha: opacity,
            width: 1.0,
            points: vec![p0, p1],
            closed: false,
        });
    }
    cmds
}

fn axis_lines(bounds: BiomeBounds, spacing: f64, color: Rgb, opacity: f32, vertical: bool) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();
    if spacing <= 0.0 {
        return cmds;
    }
    if vertical {
        let mut x = bounds.min_x;
        while x <= bounds.max_x {
            cmds.push(DrawCommand::Stroke {
                color,
                alpha: opacity,
                width: 1.0,
                points: vec![(x, bounds.min_y), (x, bounds.max_y)],
                closed: false,
            });
            x += spacing;
        }
    } else {
        let mut y = bounds.min_y;
        while y <= bounds.max_y {
            cmds.push(DrawCommand::Stroke {
                color,
                alpha: opacity,
                width: 1.0,
                points: vec![(bounds.min_x, y), (bounds.max_x, y)],
                closed: false,
            });
            y += spacing;
        }
    }
    cmds
}

fn dots(bounds: BiomeBounds, spacing: f64, line_width: f64, color: Rgb, opacity: f32) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();
    if spacing <= 0.0 {
        return cmds;
    }
    let mut y = bounds.min_y;
    while y <= bounds.max_y {
        let mut x = bounds.min_x;
        while x <= bounds.max_x {
            cmds.push(DrawCommand::Circle {
                color,
                alpha: opacity,
                center: (x, y),
                radius: line_width,
                filled: true,
            });
            x += spacing;
        }
        y += spacing;
    }
    cmds
}

fn circles(centroid: Point, farthest_vertex_dist: f64, spacing: f64, color: Rgb, opacity: f32) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();
    if spacing <= 0.0 {
        return cmds;
    }
    let mut radius = spacing;
    while radius <= farthest_vertex_dist {
        cmds.push(DrawCommand::Circle {
            color,
            alpha: opacity,
            center: centroid,
            radius,
            filled: false,
        });
        radius += spacing;
    }
    cmds
}

fn waves(bounds: BiomeBounds, spacing: f64, cell_size: f64, color: Rgb, opacity: f32) -> Vec<DrawCommand> {
    let amplitude = spacing * 0.25;
    let wavelength = 4.0 * cell_size;
    let step = 0.5 * cell_size;
    let mut cmds = Vec::new();
    if spacing <= 0.0 || wavelength <= 0.0 {
        return cmds;
    }
    let mut y0 = bounds.min_y;
    while y0 <= bounds.max_y {
        let mut points = Vec::new();
        let mut x = bounds.min_x;
        while x <= bounds.max_x {
            let phase = 2.0 * std::f64::consts::PI * (x - bounds.min_x) / wavelength;
            points.push((x, y0 + amplitude * phase.sin()));
            x += step;
        }
        if points.len() >= 2 {
            cmds.push(DrawCommand::Stroke {
                color,
                alpha: opacity,
                width: 1.0,
                points,
                closed: false,
            });
        }
        y0 += spacing;
    }
    cmds
}

fn hexagons(bounds: BiomeBounds, size: f64, color: Rgb, opacity: f32) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();
    if size <= 0.0 {
        return cmds;
    }
    let col_pitch = 1.5 * size;
    let row_pitch = 3f64.sqrt() * size;
    let mut row = 0i64;
    let mut y = bounds.min_y;
    while y <= bounds.max_y {
        let x_offset = if row % 2 == 0 { 0.0 } else { col_pitch * 0.5 };
        let mut x = bounds.min_x + x_offset;
        while x <= bounds.max_x {
            cmds.push(DrawCommand::Stroke {
                color,
                alpha: opacity,
                width: 1.0,
                points: flat_top_hexagon((x, y), size),
                closed: true,
            });
            x += col_pitch;
        }
        row += 1;
        y += row_pitch;
    }
    cmds
}

fn flat_top_hexagon(center: Point, size: f64) -> Vec<Point> {
    (0..6)
        .map(|i| {
            let angle = std::f64::consts::FRAC_PI_3 * i as f64;
            (center.0 + size * angle.cos(), center.1 + size * angle.sin())
        })
        .collect()
}

fn spots(
    bounds: BiomeBounds,
    spacing: f64,
    line_width: f64,
    color: Rgb,
    opacity: f32,
    biome_id: u8,
) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();
    if spacing <= 0.0 {
        return cmds;
    }
    let mut rng = Lcg::new(1000 + biome_id as u32 * 7919);
    // line_width already carries the cellSize multiplier.
    let min_radius = 0.5 * line_width;
    let max_radius = 1.5 * line_width;
    let mut y = bounds.min_y;
    while y <= bounds.max_y {
        let mut x = bounds.min_x;
        while x <= bounds.max_x {
            if rng.next_f64() < 0.7 {
                let jitter_x = (rng.next_f64() * 2.0 - 1.0) * 0.4 * spacing;
                let jitter_y = (rng.next_f64() * 2.0 - 1.0) * 0.4 * spacing;
                let radius = min_radius + rng.next_f64() * (max_radius - min_radius).max(0.0);
                cmds.push(DrawCommand::Circle {
                    color,
                    alpha: opacity,
                    center: (x + jitter_x, y + jitter_y),
                    radius,
                    filled: true,
                });
            }
            x += spacing;
        }
        y += spacing;
    }
    cmds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_matches_reference_sequence() {
        let mut rng = Lcg::new(1);
        assert_eq!(rng.next_raw(), (9301 + 49297) % 233280);
    }

    #[test]
    fn spots_are_deterministic_for_same_biome_id() {
        let bounds = BiomeBounds { min_x: 0.0, min_y: 0.0, max_x: 100.0, max_y: 100.0 };
        let a = spots(bounds, 10.0, 6.0, Rgb(0, 0, 0), 1.0, 3);
        let b = spots(bounds, 10.0, 6.0, Rgb(0, 0, 0), 1.0, 3);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(format!("{:?}", x), format!("{:?}", y));
        }
    }

    #[test]
    fn spots_differ_across_biome_ids() {
        let bounds = BiomeBounds { min_x: 0.0, min_y: 0.0, max_x: 100.0, max_y: 100.0 };
        let a = spots(bounds, 10.0, 6.0, Rgb(0, 0, 0), 1.0, 3);
        let b = spots(bounds, 10.0, 6.0, Rgb(0, 0, 0), 1.0, 9);
        assert_ne!(format!("{:?}", a), format!("{:?}", b));
    }

    #[test]
    fn dots_cover_lattice_points() {
        let bounds = BiomeBounds { min_x: 0.0, min_y: 0.0, max_x: 20.0, max_y: 20.0 };
        let cmds = dots(bounds, 10.0, 1.0, Rgb(0, 0, 0), 1.0);
        assert_eq!(cmds.len(), 9); // 3x3 lattice
    }

    #[test]
    fn circles_step_out_to_farthest_vertex() {
        let cmds = circles((0.0, 0.0), 25.0, 10.0, Rgb(0, 0, 0), 1.0);
        assert_eq!(cmds.len(), 2); // radii 10, 20 (30 exceeds 25)
    }
}
