//! Host drawing adapter (spec.md §6) and a concrete raster implementation.
//!
//! The core never touches pixels directly; every renderer emits
//! `DrawCommand`s against a `DrawTarget`. `RasterTarget` is the one concrete
//! target this crate ships, backed by `image::RgbaImage` the same way the
//! teacher's `export.rs` builds `image::ImageBuffer`s directly rather than
//! going through a windowing/GPU layer for its offline exports.

use image::{Rgba, RgbaImage};

use crate::color::Rgb;
use crate::geometry::Point;

#[derive(Debug, Clone)]
pub enum DrawCommand {
    Fill {
        color: Rgb,
        alpha: f32,
        /// Outer ring first, followed by zero or more hole rings.
        rings: Vec<Vec<Point>>,
    },
    Stroke {
        color: Rgb,
        alpha: f32,
        width: f32,
        points: Vec<Point>,
        closed: bool,
    },
    Circle {
        color: Rgb,
        alpha: f32,
        center: Point,
        radius: f64,
        filled: bool,
    },
    Text {
        position: Point,
        text: String,
        font_size: f32,
        color: Rgb,
        outline_color: Option<Rgb>,
        outline_width: f32,
        /// Radians, applied about `position`. Rivers rotate their label to
        /// follow the polyline tangent (spec.md §4.I); regions leave this 0.
        rotation: f64,
    },
    BeginLayer {
        name: String,
        z_index: i32,
    },
    EndLayer,
    SetMask {
        rings: Vec<Vec<Point>>,
    },
    ClearMask,
}

/// A drawing sink. Renderers are generic over this trait so the same
/// component code can target a raster export, a host canvas, or (in tests)
/// a recording target that just collects commands.
pub trait DrawTarget {
    fn submit(&mut self, command: DrawCommand);

    fn submit_all(&mut self, commands: impl IntoIterator<Item = DrawCommand>) {
        for cmd in commands {
            self.submit(cmd);
        }
    }
}

/// Collects commands without rasterizing them; useful for tests that only
/// care about what was drawn, not how it looks.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub commands: Vec<DrawCommand>,
}

impl DrawTarget for RecordingTarget {
    fn submit(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

/// Software rasterizer backed by an `image::RgbaImage`. Scanline polygon
/// fill with even-odd rule (so holes just work), Bresenham-ish stroked
/// lines, and a midpoint-circle-derived filled/unfilled disk.
pub struct RasterTarget {
    image: RgbaImage,
    mask: Option<Vec<Vec<Point>>>,
}

impl RasterTarget {
    pub fn new(width: u32, height: u32) -> Self {
        RasterTarget {
            image: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            mask: None,
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Even-odd rule across every mask ring (outer plus holes), matching
    /// `fill_polygon`'s scanline rule: a point toggles "inside" each time it
    /// crosses a ring, so a point inside the outer ring but also inside a
    /// hole ring ends up outside the mask.
    fn masked(&self, p: Point) -> bool {
        match &self.mask {
            None => true,
            Some(rings) => {
                let mut inside = false;
                for ring in rings {
                    if point_in_rings(p, ring) {
                        inside = !inside;
                    }
                }
                inside
            }
        }
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x as u32 >= self.image.width() || y as u32 >= self.image.height() {
            return;
        }
        if !self.masked((x as f64, y as f64)) {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let px = self.image.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let src = [color.0, color.1, color.2][c] as f32;
            let dst = px.0[c] as f32;
            px.0[c] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
        }
    }

    fn fill_polygon(&mut self, rings: &[Vec<Point>], color: Rgb, alpha: f32) {
        if rings.is_empty() {
            return;
        }
        let (min_y, max_y) = rings
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.1), hi.max(p.1))
            });
        let y0 = min_y.floor().max(0.0) as i64;
        let y1 = (max_y.ceil() as i64).min(self.image.height() as i64 - 1);

        for y in y0..=y1.max(y0) {
            let scan_y = y as f64 + 0.5;
            let mut xs: Vec<f64> = Vec::new();
            for ring in rings {
                let n = ring.len();
                if n < 2 {
                    continue;
                }
                for i in 0..n {
                    let a = ring[i];
                    let b = ring[(i + 1) % n];
                    if (a.1 <= scan_y) != (b.1 <= scan_y) {
                        let t = (scan_y - a.1) / (b.1 - a.1);
                        xs.push(a.0 + t * (b.0 - a.0));
                    }
                }
            }
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mut i = 0;
            while i + 1 < xs.len() {
                let x0 = xs[i].round() as i64;
                let x1 = xs[i + 1].round() as i64;
                for x in x0..x1 {
                    self.blend(x, y, color, alpha);
                }
                i += 2;
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgb, alpha: f32, width: f32) {
        if points.len() < 2 {
            return;
        }
        let n = points.len();
        let edge_count = if closed { n } else { n - 1 };
        for i in 0..edge_count {
            self.draw_thick_line(points[i], points[(i + 1) % n], color, alpha, width);
        }
    }

    fn draw_thick_line(&mut self, a: Point, b: Point, color: Rgb, alpha: f32, width: f32) {
        let dx = b.0 - a.0;
        let dy = b.1 - a.1;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1e-9 {
            return;
        }
        let steps = (len.ceil() as i64).max(1);
        let half_w = (width as f64 / 2.0).max(0.5);
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let cx = a.0 + dx * t;
            let cy = a.1 + dy * t;
            let r = half_w.ceil() as i64;
            for oy in -r..=r {
                for ox in -r..=r {
                    if ((ox * ox + oy * oy) as f64).sqrt() <= half_w {
                        self.blend(cx.round() as i64 + ox, cy.round() as i64 + oy, color, alpha);
                    }
                }
            }
        }
    }

    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgb, alpha: f32, filled: bool) {
        let r = radius.max(0.0);
        let cx = center.0;
        let cy = center.1;
        let steps = ((r * 2.0 * std::f64::consts::PI).ceil() as i64).max(8);
        if filled {
            let y0 = (cy - r).floor() as i64;
            let y1 = (cy + r).ceil() as i64;
            for y in y0..=y1 {
                let dy = y as f64 + 0.5 - cy;
                if dy.abs() > r {
                    continue;
                }
                let dx = (r * r - dy * dy).sqrt();
                let x0 = (cx - dx).round() as i64;
                let x1 = (cx + dx).round() as i64;
                for x in x0..=x1 {
                    self.blend(x, y, color, alpha);
                }
            }
        } else {
            for s in 0..steps {
                let theta = 2.0 * std::f64::consts::PI * s as f64 / steps as f64;
                let x = cx + r * theta.cos();
                let y = cy + r * theta.sin();
                self.blend(x.round() as i64, y.round() as i64, color, alpha);
            }
        }
    }
}

fn point_in_rings(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return true;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        let intersects = ((yi > p.1) != (yj > p.1)) && (p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi);
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl DrawTarget for RasterTarget {
    fn submit(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Fill { color, alpha, rings } => self.fill_polygon(&rings, color, alpha),
            DrawCommand::Stroke { color, alpha, width, points, closed } => {
                self.stroke_polyline(&points, closed, color, alpha, width)
            }
            DrawCommand::Circle { color, alpha, center, radius, filled } => {
                self.draw_circle(center, radius, color, alpha, filled)
            }
            DrawCommand::Text { .. } => {
                // Text shaping is out of scope (spec.md Non-goals); callers
                // that need a visual marker should draw their own glyph.
            }
            DrawCommand::BeginLayer { .. } | DrawCommand::EndLayer => {}
            DrawCommand::SetMask { rings } => self.mask = Some(rings),
            DrawCommand::ClearMask => self.mask = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_square_paints_interior() {
        let mut target = RasterTarget::new(20, 20);
        target.submit(DrawCommand::Fill {
            color: Rgb(255, 0, 0),
            alpha: 1.0,
            rings: vec![vec![(2.0, 2.0), (18.0, 2.0), (18.0, 18.0), (2.0, 18.0)]],
        });
        let center = target.image.get_pixel(10, 10);
        assert_eq!(center.0[0], 255);
        assert_eq!(center.0[1], 0);
    }

    #[test]
    fn mask_clips_fill() {
        let mut target = RasterTarget::new(20, 20);
        target.submit(DrawCommand::SetMask {
            rings: vec![vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)]],
        });
        target.submit(DrawCommand::Fill {
            color: Rgb(0, 255, 0),
            alpha: 1.0,
            rings: vec![vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]],
        });
        let outside = target.image.get_pixel(15, 15);
        assert_eq!(outside.0[0], 255); // still white background, red channel untouched
        let inside = target.image.get_pixel(2, 2);
        assert_eq!(inside.0[0], 0);
    }

    #[test]
    fn mask_hole_ring_excludes_its_interior() {
        let mut target = RasterTarget::new(20, 20);
        target.submit(DrawCommand::SetMask {
            rings: vec![
                vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)],
                vec![(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)],
            ],
        });
        target.submit(DrawCommand::Fill {
            color: Rgb(0, 255, 0),
            alpha: 1.0,
            rings: vec![vec![(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]],
        });
        let in_outer_not_hole = target.image.get_pixel(2, 2);
        assert_eq!(in_outer_not_hole.0[1], 255);
        let in_hole = target.image.get_pixel(10, 10);
        assert_eq!(in_hole.0[0], 255); // untouched background, excluded by the hole
    }
}
