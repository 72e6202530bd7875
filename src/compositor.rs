//! Scene orchestration (component L).
//!
//! Owns the current `Grid`, `BiomeResolver`, vector collections and render
//! settings, and assembles the per-layer draw commands in the fixed z-order
//! from spec.md §4.L: biome fills -> biome patterns -> height contours &
//! hachures -> rivers -> region fills/strokes -> region hover overlay ->
//! region labels -> river labels. Grounded in the teacher's `world.rs`
//! (`WorldData` bundling several generated layers behind one struct that
//! downstream exporters pull from in a fixed order) and `menu.rs`'s
//! `WorldConfig`-driven rebuild, adapted from a one-shot generation pipeline
//! to a re-render-on-demand one since this crate's scene can change after a
//! brush stroke or a mode switch.

use std::collections::BTreeMap;

use crate::biome_renderer::{self, BiomeShape};
use crate::biome_resolver::{BiomeOverride, BiomeResolver};
use crate::brush::{self, BrushStroke, BrushTool};
use crate::color::Rgb;
use crate::config::{BiomesMode, HeightsMode, WorldMapConfig};
use crate::diagnostics::{DiagnosticLog, Layer};
use crate::draw::{DrawCommand, DrawTarget, RasterTarget};
use crate::error::MapError;
use crate::grid::Grid;
use crate::height_contour::{self, ContourStyle};
use crate::river::VectorRiver;
use crate::vector_region::{self, VectorRegion};

/// What's currently hovered, if anything (spec.md §4.L `hover(x,y)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    Region(u64),
    River(u64),
}

/// The fully composited scene: one command list per layer, in draw order.
/// Kept as separate layers (rather than one flat list) so a host can
/// cross-fade or toggle a single layer without re-running the others.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub biome_fills: Vec<DrawCommand>,
    pub biome_patterns: Vec<DrawCommand>,
    pub height_contours: Vec<DrawCommand>,
    pub rivers: Vec<DrawCommand>,
    pub regions: Vec<DrawCommand>,
    pub region_hover: Vec<DrawCommand>,
    pub region_labels: Vec<DrawCommand>,
    pub river_labels: Vec<DrawCommand>,
}

impl Scene {
    /// Flatten every layer into the single z-ordered command stream a
    /// `DrawTarget` expects, per spec.md §4.L's ordering.
    pub fn flatten(&self) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        out.extend(self.biome_fills.iter().cloned());
        out.extend(self.biome_patterns.iter().cloned());
        out.extend(self.height_contours.iter().cloned());
        out.extend(self.rivers.iter().cloned());
        out.extend(self.regions.iter().cloned());
        out.extend(self.region_hover.iter().cloned());
        out.extend(self.region_labels.iter().cloned());
        out.extend(self.river_labels.iter().cloned());
        out
    }
}

/// Orchestrates grid, biome resolver, vector layers and render settings
/// into a composited `Scene`. See spec.md §4.L and §5 for the ordering and
/// concurrency guarantees this type upholds.
pub struct Compositor {
    grid: Option<Grid>,
    grid_version: u64,
    resolver: BiomeResolver,
    rivers: Vec<VectorRiver>,
    regions: Vec<VectorRegion>,
    config: WorldMapConfig,
    scene: Scene,
    hover: Option<HoverTarget>,
    open_stroke: Option<BrushStroke>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Compositor {
            grid: None,
            grid_version: 0,
            resolver: BiomeResolver::with_defaults(),
            rivers: Vec::new(),
            regions: Vec::new(),
            config: WorldMapConfig::default(),
            scene: Scene::default(),
            hover: None,
            open_stroke: None,
        }
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn config(&self) -> &WorldMapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WorldMapConfig {
        &mut self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn rivers(&self) -> &[VectorRiver] {
        &self.rivers
    }

    pub fn regions(&self) -> &[VectorRegion] {
        &self.regions
    }

    /// Load (or replace) the grid. Any open brush stroke is invalidated:
    /// its version no longer matches, so a pending `commit` is discarded.
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = Some(grid);
        self.grid_version += 1;
        self.open_stroke = None;
    }

    pub fn set_rivers(&mut self, rivers: Vec<VectorRiver>) {
        self.rivers = rivers;
    }

    pub fn set_regions(&mut self, regions: Vec<VectorRegion>) {
        self.regions = regions;
    }

    /// Reload the biome resolver's overrides. Per spec.md §5, this must
    /// happen between renders; callers should not call this while holding
    /// a reference into a previous `Scene`.
    pub fn reload_biome_overrides(&mut self, overrides: &[BiomeOverride]) {
        let mut resolver = BiomeResolver::with_defaults();
        resolver.apply_overrides(overrides);
        self.resolver = resolver;
    }

    pub fn biome_configs(&self) -> &BTreeMap<u8, crate::biome_resolver::BiomeConfig> {
        self.resolver.configs()
    }

    /// Open a brush stroke against the current grid version. Returns `None`
    /// (and logs `MissingGrid`) if no grid is loaded, per spec.md §7's
    /// no-op-with-warning rule.
    pub fn begin_brush_stroke(&mut self, log: &mut DiagnosticLog) -> bool {
        match &self.grid {
            Some(grid) => {
                self.open_stroke = Some(BrushStroke::open(grid, self.grid_version));
                true
            }
            None => {
                log.push(Layer::Export, MapError::MissingGrid);
                false
            }
        }
    }

    pub fn apply_brush(
        &mut self,
        tool: BrushTool,
        world_x: f64,
        world_y: f64,
        radius: f64,
        strength: f64,
        target: f64,
    ) {
        let (Some(grid), Some(stroke)) = (&self.grid, self.open_stroke.as_mut()) else {
            return;
        };
        stroke.apply(grid, tool, world_x, world_y, radius, strength, target);
    }

    /// Commit the open stroke and re-render. A no-op if no stroke is open,
    /// or if the stroke's grid version no longer matches (grid was replaced
    /// mid-stroke, per spec.md §5's abort rule) -- `BrushStroke::commit`
    /// itself handles the version check and logs it.
    pub fn commit_brush_stroke(
        &mut self,
        brush_strength: f64,
        log: &mut DiagnosticLog,
    ) -> Result<(), MapError> {
        let Some(stroke) = self.open_stroke.take() else {
            return Ok(());
        };
        let Some(grid) = self.grid.as_mut() else {
            log.push(Layer::Export, MapError::MissingGrid);
            return Ok(());
        };
        stroke.commit(grid, self.grid_version, brush_strength, log)?;
        self.render(log);
        Ok(())
    }

    /// Whole-grid smoothing outside of a stroke (spec.md §4.K "Global
    /// smooth"), then a full re-render.
    pub fn global_smooth(&mut self, iterations: usize, log: &mut DiagnosticLog) {
        let Some(grid) = self.grid.as_mut() else {
            log.push(Layer::Export, MapError::MissingGrid);
            return;
        };
        brush::global_smooth(grid, iterations, self.config.global_smooth_strength as f64);
        self.render(log);
    }

    pub fn set_heights_mode(&mut self, mode: HeightsMode, log: &mut DiagnosticLog) {
        self.config.heights_mode = mode;
        self.render_height_layer(log);
    }

    pub fn set_biomes_mode(&mut self, mode: BiomesMode, log: &mut DiagnosticLog) {
        self.config.biomes_mode = mode;
        self.render_biome_layers(log);
    }

    /// Full rebuild of every layer. Per spec.md §7, a layer that fails
    /// keeps its previously rendered commands rather than going blank.
    pub fn render(&mut self, log: &mut DiagnosticLog) {
        self.render_biome_layers(log);
        self.render_height_layer(log);
        self.render_vector_layers();
    }

    fn render_biome_layers(&mut self, log: &mut DiagnosticLog) {
        let Some(grid) = &self.grid else {
            log.push(Layer::BiomeFills, MapError::MissingGrid);
            return;
        };
        if let Err(e) = grid.validate() {
            log.push(Layer::BiomeFills, e);
            return;
        }

        match self.config.biomes_mode {
            BiomesMode::Off => {
                self.scene.biome_fills.clear();
                self.scene.biome_patterns.clear();
            }
            BiomesMode::Cells => {
                self.scene.biome_fills = cell_fill_commands(grid, &self.resolver);
                self.scene.biome_patterns.clear();
            }
            BiomesMode::Fancy | BiomesMode::FancyDebug => {
                let shapes: Vec<BiomeShape> = biome_renderer::render_biome_regions(grid, &self.resolver);
                let mut fills = Vec::new();
                let mut patterns = Vec::new();
                for shape in &shapes {
                    let cmds = biome_renderer::shape_to_draw_commands(shape, &self.resolver, grid.cell_size);
                    for cmd in cmds {
                        match &cmd {
                            DrawCommand::Fill { .. } => fills.push(cmd),
                            _ => patterns.push(cmd),
                        }
                    }
                }
                if self.config.biomes_mode == BiomesMode::FancyDebug {
                    fills.extend(biome_renderer::debug_border_commands(grid, &self.resolver));
                }
                self.scene.biome_fills = fills;
                self.scene.biome_patterns = patterns;
            }
        }
    }

    fn render_height_layer(&mut self, log: &mut DiagnosticLog) {
        let Some(grid) = &self.grid else {
            log.push(Layer::HeightContours, MapError::MissingGrid);
            return;
        };
        if let Err(e) = grid.validate() {
            log.push(Layer::HeightContours, e);
            return;
        }

        self.scene.height_contours = match self.config.heights_mode {
            HeightsMode::Off => Vec::new(),
            HeightsMode::Cells => height_cell_commands(grid),
            HeightsMode::ContoursBw => height_contour::render_height_contours(
                grid,
                ContourStyle::BlackAndWhite,
                self.config.height_contour_alpha,
            ),
            HeightsMode::Contours => height_contour::render_height_contours(
                grid,
                ContourStyle::Colored,
                self.config.height_contour_alpha,
            ),
        };
    }

    fn render_vector_layers(&mut self) {
        self.scene.rivers = self
            .rivers
            .iter()
            .flat_map(|r| r.render(Rgb(40, 110, 200), 0.9))
            .collect();

        let mut region_cmds = Vec::new();
        for region in &self.regions {
            region_cmds.extend(region.render());
        }
        self.scene.regions = region_cmds;

        self.refresh_hover_overlay();
        self.scene.region_labels = self.regions.iter().map(region_label_command).collect();
        self.scene.river_labels = self
            .rivers
            .iter()
            .filter_map(|r| river_label_command(r, self.config.rotate_river_labels))
            .collect();
    }

    /// Find the nearest region and/or river at a world-space point and
    /// update the hover overlay graphics. Caches (label anchors, bounds)
    /// invalidate automatically because they're recomputed here each call,
    /// per spec.md §5's "invalidated at the start of every vector layer
    /// rebuild" rule.
    pub fn hover(&mut self, x: f64, y: f64) {
        let region_hit = vector_region::hit_test(&self.regions, (x, y)).map(|r| r.id);
        let river_hit = self
            .rivers
            .iter()
            .filter_map(|r| r.hit_test((x, y)).map(|hit| (r.id, hit.distance)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(id, _)| id);

        self.hover = match (region_hit, river_hit) {
            (Some(r), _) => Some(HoverTarget::Region(r)),
            (None, Some(r)) => Some(HoverTarget::River(r)),
            (None, None) => None,
        };
        self.refresh_hover_overlay();
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
        self.scene.region_hover.clear();
    }

    fn refresh_hover_overlay(&mut self) {
        self.scene.region_hover.clear();
        if let Some(HoverTarget::Region(id)) = self.hover {
            if let Some(region) = self.regions.iter().find(|r| r.id == id) {
                self.scene.region_hover.push(DrawCommand::Stroke {
                    color: Rgb(255, 255, 255),
                    alpha: 0.9,
                    width: region.stroke_width + 2.0,
                    points: region.points.clone(),
                    closed: region.closed,
                });
            }
        }
    }

    /// Offscreen render of the composited scene. Hover overlays are hidden
    /// during export, per spec.md §4.L. `max_dimension` models the host's
    /// maximum texture size (spec.md §7 `TextureSizeExceeded`): the request
    /// downscales to fit rather than failing, since `allow_downscale` is
    /// this crate's default policy for its own `RasterTarget`.
    pub fn export_to_image(
        &self,
        width: u32,
        height: u32,
        scale: f64,
        max_dimension: u32,
    ) -> Result<image::RgbaImage, MapError> {
        let req_w = ((width as f64) * scale).round() as u32;
        let req_h = ((height as f64) * scale).round() as u32;

        let downscale = if req_w > max_dimension || req_h > max_dimension {
            (max_dimension as f64 / req_w.max(req_h) as f64).min(1.0)
        } else {
            1.0
        };
        let out_w = ((req_w as f64) * downscale).round().max(1.0) as u32;
        let out_h = ((req_h as f64) * downscale).round().max(1.0) as u32;

        // Scene geometry is authored in world units at a 1:1 ratio with an
        // unscaled canvas; `scale` (plus any clamping downscale) is a
        // pixel-per-world-unit factor that every emitted coordinate, radius
        // and stroke/outline width must be multiplied by, or content only
        // ever paints the unscaled top-left corner of the requested canvas.
        let pixel_factor = scale * downscale;

        let mut target = RasterTarget::new(out_w, out_h);
        for cmd in self.scene.biome_fills.iter().chain(
            self.scene.biome_patterns.iter().chain(
                self.scene.height_contours.iter().chain(self.scene.rivers.iter().chain(
                    self.scene.regions.iter().chain(
                        self.scene
                            .region_labels
                            .iter()
                            .chain(self.scene.river_labels.iter()),
                    ),
                )),
            ),
        ) {
            target.submit(scale_command(cmd, pixel_factor));
        }
        Ok(target.into_image())
    }
}

/// Scale every coordinate, radius and width a `DrawCommand` carries by
/// `factor`, mapping world-space scene geometry into the export canvas's
/// pixel space (see `Compositor::export_to_image`).
fn scale_command(cmd: &DrawCommand, factor: f64) -> DrawCommand {
    let sp = |p: crate::geometry::Point| -> crate::geometry::Point { (p.0 * factor, p.1 * factor) };
    match cmd.clone() {
        DrawCommand::Fill { color, alpha, rings } => DrawCommand::Fill {
            color,
            alpha,
            rings: rings.into_iter().map(|ring| ring.into_iter().map(sp).collect()).collect(),
        },
        DrawCommand::Stroke { color, alpha, width, points, closed } => DrawCommand::Stroke {
            color,
            alpha,
            width: (width as f64 * factor) as f32,
            points: points.into_iter().map(sp).collect(),
            closed,
        },
        DrawCommand::Circle { color, alpha, center, radius, filled } => DrawCommand::Circle {
            color,
            alpha,
            center: sp(center),
            radius: radius * factor,
            filled,
        },
        DrawCommand::Text { position, text, font_size, color, outline_color, outline_width, rotation } => {
            DrawCommand::Text {
                position: sp(position),
                text,
                font_size: (font_size as f64 * factor) as f32,
                color,
                outline_color,
                outline_width: (outline_width as f64 * factor) as f32,
                rotation,
            }
        }
        DrawCommand::BeginLayer { name, z_index } => DrawCommand::BeginLayer { name, z_index },
        DrawCommand::EndLayer => DrawCommand::EndLayer,
        DrawCommand::SetMask { rings } => DrawCommand::SetMask {
            rings: rings.into_iter().map(|ring| ring.into_iter().map(sp).collect()).collect(),
        },
        DrawCommand::ClearMask => DrawCommand::ClearMask,
    }
}

/// `BiomesMode::Cells`: one flat-colored rect per cell, no smoothing. A
/// cheap debug view, grounded in the teacher's raw per-tile colormap export
/// (`export.rs::export_heightmap` walks the tilemap cell by cell rather than
/// tracing contours).
fn cell_fill_commands(grid: &Grid, resolver: &BiomeResolver) -> Vec<DrawCommand> {
    let ids = resolver.resolve_grid(grid);
    let mut cmds = Vec::with_capacity(ids.len());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let idx = grid.index(row, col);
            let Some(cfg) = resolver.config(ids[idx]) else {
                continue;
            };
            let (x0, y0) = grid.cell_rect_origin(row, col);
            let cs = grid.cell_size;
            cmds.push(DrawCommand::Fill {
                color: cfg.color,
                alpha: 1.0,
                rings: vec![vec![
                    (x0, y0),
                    (x0 + cs, y0),
                    (x0 + cs, y0 + cs),
                    (x0, y0 + cs),
                ]],
            });
        }
    }
    cmds
}

/// `HeightsMode::Cells`: per-cell fill colored by the same ramp the contour
/// layer uses, for a quick raw-data debug view without tracing contours.
fn height_cell_commands(grid: &Grid) -> Vec<DrawCommand> {
    let (min_h, max_h) = grid.height_range();
    let span = (max_h - min_h).max(1e-6);
    let mut cmds = Vec::with_capacity(grid.rows * grid.cols);
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let idx = grid.index(row, col);
            let t = (grid.heights[idx] - min_h) / span;
            let color = crate::color::height_contour_color(t);
            let (x0, y0) = grid.cell_rect_origin(row, col);
            let cs = grid.cell_size;
            cmds.push(DrawCommand::Fill {
                color,
                alpha: 1.0,
                rings: vec![vec![
                    (x0, y0),
                    (x0 + cs, y0),
                    (x0 + cs, y0 + cs),
                    (x0, y0 + cs),
                ]],
            });
        }
    }
    cmds
}

/// Region label: white text with a black outline (spec.md §4.J), anchored
/// at the region's centroid, font size shrunk (never grown) to fit the
/// region's width budget via `vector_region::label_font_size`.
fn region_label_command(region: &VectorRegion) -> DrawCommand {
    let (min_x, _, max_x, _) = region.bounds();
    let width = max_x - min_x;
    let base_size = vector_region::BASE_LABEL_FONT_SIZE;
    let text_width = vector_region::estimate_text_width(&region.name, base_size);
    let font_size = vector_region::label_font_size(width, region.stroke_width, base_size, text_width);
    DrawCommand::Text {
        position: region.centroid(),
        text: region.name.clone(),
        font_size,
        color: Rgb(255, 255, 255),
        outline_color: Some(Rgb(0, 0, 0)),
        outline_width: font_size * 0.22,
        rotation: 0.0,
    }
}

/// River label: anchored at the polyline midpoint by arc length, rotated to
/// follow the river's tangent when `rotate_river_labels` is set (spec.md
/// §4.I), folded into `[-pi/2, pi/2]` by `VectorRiver::label_angle` so it
/// never renders upside down. `None` for a river with no vertices.
fn river_label_command(river: &VectorRiver, rotate: bool) -> Option<DrawCommand> {
    let anchor = river.label_anchor()?;
    let rotation = if rotate { river.label_angle() } else { 0.0 };
    let font_size = vector_region::BASE_LABEL_FONT_SIZE;
    Some(DrawCommand::Text {
        position: anchor,
        text: river.name.clone(),
        font_size,
        color: Rgb(255, 255, 255),
        outline_color: Some(Rgb(0, 0, 0)),
        outline_width: font_size * 0.22,
        rotation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome_resolver::{BiomeConfig, BIOME_DESERT, BIOME_OCEAN};
    use crate::river::RiverVertex;
    use std::collections::BTreeMap;

    fn two_biome_grid() -> Grid {
        let mut grid = Grid::flat(4, 4, 10.0);
        for r in 0..4 {
            for c in 0..4 {
                let idx = grid.index(r, c);
                grid.biomes[idx] = if c < 2 { BIOME_OCEAN } else { BIOME_DESERT };
            }
        }
        grid
    }

    #[test]
    fn render_without_grid_logs_missing_grid() {
        let mut compositor = Compositor::new();
        let mut log = DiagnosticLog::new();
        compositor.render(&mut log);
        assert!(!log.is_empty());
        assert!(compositor.scene().biome_fills.is_empty());
    }

    #[test]
    fn full_render_populates_biome_and_height_layers() {
        let mut compositor = Compositor::new();
        let mut configs = BTreeMap::new();
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        compositor.resolver = BiomeResolver::new(configs);
        compositor.set_grid(two_biome_grid());

        let mut log = DiagnosticLog::new();
        compositor.render(&mut log);
        assert!(log.is_empty());
        assert!(!compositor.scene().biome_fills.is_empty());
    }

    #[test]
    fn brush_stroke_aborted_by_grid_replacement_leaves_scene_consistent() {
        let mut compositor = Compositor::new();
        compositor.set_grid(Grid::flat(5, 5, 1.0));
        let mut log = DiagnosticLog::new();
        compositor.begin_brush_stroke(&mut log);
        compositor.apply_brush(BrushTool::Raise, 2.0, 2.0, 3.0, 1.0, 0.0);

        // Replacing the grid mid-stroke bumps the version; commit should
        // find the mismatch and no-op rather than panicking.
        compositor.set_grid(Grid::flat(5, 5, 1.0));
        let result = compositor.commit_brush_stroke(1.0, &mut log);
        assert!(result.is_ok());
    }

    #[test]
    fn hover_prefers_region_over_river() {
        let mut compositor = Compositor::new();
        compositor.set_regions(vec![VectorRegion {
            id: 1,
            name: "R".to_string(),
            points: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            closed: true,
            fill_color: Rgb(10, 10, 10),
            fill_alpha: 1.0,
            stroke_color: Rgb(0, 0, 0),
            stroke_alpha: 1.0,
            stroke_width: 1.0,
        }]);
        compositor.set_rivers(vec![VectorRiver {
            id: 2,
            name: "River".to_string(),
            vertices: vec![
                RiverVertex { point: (0.0, 5.0), width: 2.0 },
                RiverVertex { point: (10.0, 5.0), width: 2.0 },
            ],
        }]);
        compositor.hover(5.0, 5.0);
        assert_eq!(compositor.hover, Some(HoverTarget::Region(1)));
    }

    #[test]
    fn fancy_debug_adds_border_strokes_over_fancy() {
        let mut compositor = Compositor::new();
        let mut configs = BTreeMap::new();
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        compositor.resolver = BiomeResolver::new(configs);
        compositor.set_grid(two_biome_grid());

        let mut log = DiagnosticLog::new();
        compositor.render(&mut log);
        let fancy_count = compositor.scene().biome_fills.len();

        compositor.set_biomes_mode(BiomesMode::FancyDebug, &mut log);
        let debug_count = compositor.scene().biome_fills.len();
        assert!(debug_count > fancy_count);
        assert!(compositor
            .scene()
            .biome_fills
            .iter()
            .any(|c| matches!(c, DrawCommand::Stroke { .. })));
    }

    #[test]
    fn export_downscales_to_fit_max_dimension() {
        let mut compositor = Compositor::new();
        compositor.set_grid(Grid::flat(4, 4, 10.0));
        let mut log = DiagnosticLog::new();
        compositor.render(&mut log);
        let image = compositor.export_to_image(2000, 1000, 1.0, 512).unwrap();
        assert!(image.width() <= 512);
        assert!(image.height() <= 512);
    }

    #[test]
    fn export_scale_stretches_geometry_not_just_canvas() {
        let mut compositor = Compositor::new();
        compositor.set_regions(vec![VectorRegion {
            id: 1,
            name: "R".to_string(),
            points: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            closed: true,
            fill_color: Rgb(200, 30, 30),
            fill_alpha: 1.0,
            stroke_color: Rgb(0, 0, 0),
            stroke_alpha: 1.0,
            stroke_width: 1.0,
        }]);
        compositor.render_vector_layers();

        // At scale 1, a 10x10 square anchored at the origin occupies the
        // top-left corner of a 40x40 canvas; the bottom-right quadrant stays
        // background-white.
        let unscaled = compositor.export_to_image(40, 40, 1.0, 4096).unwrap();
        assert_eq!(unscaled.get_pixel(35, 35).0[0], 255);

        // At scale 4 the same world-space square should reach into what was
        // previously untouched canvas, not stay pinned to the corner.
        let scaled = compositor.export_to_image(40, 40, 4.0, 4096).unwrap();
        let p = scaled.get_pixel(35, 35);
        assert_eq!(p.0[0], 200);
        assert_eq!(p.0[1], 30);
    }

    #[test]
    fn render_emits_region_and_river_labels() {
        let mut compositor = Compositor::new();
        compositor.set_regions(vec![VectorRegion {
            id: 1,
            name: "Sunset Bay".to_string(),
            points: vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            closed: true,
            fill_color: Rgb(200, 30, 30),
            fill_alpha: 1.0,
            stroke_color: Rgb(0, 0, 0),
            stroke_alpha: 1.0,
            stroke_width: 1.0,
        }]);
        compositor.set_rivers(vec![VectorRiver {
            id: 2,
            name: "Long River".to_string(),
            vertices: vec![
                RiverVertex { point: (0.0, 0.0), width: 4.0 },
                RiverVertex { point: (100.0, 0.0), width: 4.0 },
            ],
        }]);
        compositor.render_vector_layers();

        assert_eq!(compositor.scene().region_labels.len(), 1);
        assert_eq!(compositor.scene().river_labels.len(), 1);
        assert!(matches!(compositor.scene().region_labels[0], DrawCommand::Text { .. }));
        if let DrawCommand::Text { rotation, .. } = &compositor.scene().river_labels[0] {
            assert!(rotation.abs() <= std::f64::consts::FRAC_PI_2 + 1e-9);
        } else {
            panic!("expected a Text command for the river label");
        }
    }

    #[test]
    fn disabling_rotate_river_labels_zeroes_rotation() {
        let mut compositor = Compositor::new();
        compositor.config_mut().rotate_river_labels = false;
        compositor.set_rivers(vec![VectorRiver {
            id: 1,
            name: "River".to_string(),
            vertices: vec![
                RiverVertex { point: (0.0, 0.0), width: 4.0 },
                RiverVertex { point: (100.0, 50.0), width: 4.0 },
            ],
        }]);
        compositor.render_vector_layers();

        let DrawCommand::Text { rotation, .. } = &compositor.scene().river_labels[0] else {
            panic!("expected a Text command for the river label");
        };
        assert_eq!(*rotation, 0.0);
    }
}
