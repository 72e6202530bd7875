//! Rank-ordered biome fill rendering (component F).
//!
//! For each biome, painted lowest render rank first, a binary mask is built
//! from that biome's own cells plus a one-ring expansion into still-unpainted
//! neighbor cells (closing hairline cracks at three-way junctions), run
//! through the region filter to erase single-cell speckle, then traced with
//! marching squares, stitched, smoothed and nested exactly like the height
//! contour renderer. Grounded in the teacher's `water_bodies.rs`
//! BFS-over-grid shape for the neighbor walk, and in `world.rs`'s pattern of
//! deriving several render-ready layers from one `WorldData` in a fixed
//! order.

use std::collections::BTreeMap;

use crate::biome_resolver::{BiomeConfig, BiomeResolver};
use crate::draw::DrawCommand;
use crate::geometry::contour::{self, Path};
use crate::geometry::marching_squares;
use crate::geometry::region_filter;
use crate::geometry::Point;
use crate::grid::Grid;
use crate::pattern::{self, BiomeBounds};

const CHAIKIN_ITERATIONS: usize = 2;
/// Speckle threshold fed to `region_filter::filter_region` before tracing:
/// a lone cell or two stranded inside/outside a biome's mask is noise from
/// the classifier, not a feature worth a contour of its own.
const SPECKLE_MIN_SIZE: usize = 2;
/// Darken factor and stroke width for the `BiomesMode::FancyDebug` border
/// overlay (spec.md §4.F step 5).
const DEBUG_BORDER_DARKEN: f32 = 0.5;
const DEBUG_BORDER_WIDTH: f32 = 1.5;

/// A single renderable shape for one biome: a filled region (with holes)
/// plus the set of root-level closed outlines, in the padded-mask coordinate
/// space already translated back to world space.
#[derive(Debug, Clone)]
pub struct BiomeShape {
    pub biome_id: u8,
    /// Closed, smoothed outlines. `parents[i] == -1` means a root (solid)
    /// outline; otherwise it's a hole (or island) nested inside `parents[i]`.
    pub outlines: Vec<Path>,
    pub parents: Vec<i64>,
}

/// Render every enabled biome present on the grid, lowest `render_rank`
/// first, returning one `BiomeShape` per biome that actually covers any
/// cells.
pub fn render_biome_regions(grid: &Grid, resolver: &BiomeResolver) -> Vec<BiomeShape> {
    let rows = grid.rows;
    let cols = grid.cols;
    let biome_ids = resolver.resolve_grid(grid);

    let mut ordered: Vec<(u8, &BiomeConfig)> = resolver
        .configs()
        .iter()
        .filter(|(_, cfg)| cfg.enabled)
        .map(|(&id, cfg)| (id, cfg))
        .collect();
    ordered.sort_by(|a, b| a.1.render_rank.cmp(&b.1.render_rank).then(a.0.cmp(&b.0)));

    let mut painted = vec![false; rows * cols];
    let mut shapes = Vec::new();

    for (biome_id, _) in ordered {
        let core: Vec<usize> = (0..rows * cols)
            .filter(|&i| biome_ids[i] == biome_id && !painted[i])
            .collect();
        if core.is_empty() {
            continue;
        }

        let mut mask = vec![false; rows * cols];
        for &idx in &core {
            mask[idx] = true;
        }
        // One-ring expansion into unpainted neighbors, regardless of their biome id.
        let mut expanded = mask.clone();
        for &idx in &core {
            let row = idx / cols;
            let col = idx % cols;
            for (nr, nc) in neighbors8(row, col, rows, cols) {
                let nidx = nr * cols + nc;
                if !painted[nidx] {
                    expanded[nidx] = true;
                }
            }
        }

        let paths = trace_mask(&expanded, rows, cols, grid);

        for &idx in &core {
            painted[idx] = true;
        }

        // A core this small can still vanish entirely once the region
        // filter erases it as speckle; don't emit a shape with nothing to draw.
        if paths.is_empty() {
            continue;
        }

        let parents = contour::build_hierarchy(&paths);
        shapes.push(BiomeShape {
            biome_id,
            outlines: paths,
            parents,
        });
    }

    shapes
}

/// Per spec.md §4.F step 5: rerun steps c–e (pad, filter, trace, stitch,
/// smooth) on each biome's *unexpanded* core mask, for a debug overlay that
/// shows exactly which cells classified as that biome before the one-ring
/// expansion closed the junction cracks. Returned in the same rank order as
/// `render_biome_regions`.
pub fn render_biome_debug_borders(grid: &Grid, resolver: &BiomeResolver) -> Vec<(u8, Vec<Path>)> {
    let rows = grid.rows;
    let cols = grid.cols;
    let biome_ids = resolver.resolve_grid(grid);

    let mut ordered: Vec<(u8, &BiomeConfig)> = resolver
        .configs()
        .iter()
        .filter(|(_, cfg)| cfg.enabled)
        .map(|(&id, cfg)| (id, cfg))
        .collect();
    ordered.sort_by(|a, b| a.1.render_rank.cmp(&b.1.render_rank).then(a.0.cmp(&b.0)));

    let mut out = Vec::new();
    for (biome_id, _) in ordered {
        let mask: Vec<bool> = (0..rows * cols).map(|i| biome_ids[i] == biome_id).collect();
        if !mask.iter().any(|&b| b) {
            continue;
        }
        out.push((biome_id, trace_mask(&mask, rows, cols, grid)));
    }
    out
}

/// Shared steps (c)-(e): pad a cell mask, erase sub-threshold speckle, trace
/// with marching squares, stitch segments into paths and Chaikin-smooth them.
fn trace_mask(mask: &[bool], rows: usize, cols: usize, grid: &Grid) -> Vec<Path> {
    let mut padded = pad_mask(mask, rows, cols);
    padded = region_filter::filter_region(&padded, rows + 2, cols + 2, SPECKLE_MIN_SIZE, 0);
    let origin = grid.cell_rect_origin(0, 0);
    let segments = marching_squares::extract_mask(
        &padded,
        rows + 2,
        cols + 2,
        (origin.0 - grid.cell_size, origin.1 - grid.cell_size),
        grid.cell_size,
    );
    let mut paths = contour::stitch(&segments);
    for path in &mut paths {
        if path.points.len() >= 3 {
            path.points = contour::chaikin(&path.points, path.closed, CHAIKIN_ITERATIONS, true);
        }
    }
    paths
}

/// Turn a rendered biome shape into draw calls: one solid fill (all of its
/// closed outlines together, so the even-odd scanline rule in
/// `draw::RasterTarget` produces correct hole/island nesting without the
/// caller grouping depths manually), then — if the biome carries a pattern —
/// the pattern's own commands clipped to the same outline set.
pub fn shape_to_draw_commands(
    shape: &BiomeShape,
    resolver: &BiomeResolver,
    cell_size: f64,
) -> Vec<DrawCommand> {
    let Some(cfg) = resolver.config(shape.biome_id) else {
        return Vec::new();
    };

    let rings: Vec<Vec<Point>> = shape
        .outlines
        .iter()
        .filter(|p| p.closed && p.points.len() >= 3)
        .map(|p| p.points.clone())
        .collect();
    if rings.is_empty() {
        return Vec::new();
    }

    let mut cmds = vec![DrawCommand::Fill {
        color: cfg.color,
        alpha: 1.0,
        rings: rings.clone(),
    }];

    if let Some(pattern_cfg) = &cfg.pattern {
        let bounds = rings_bounds(&rings);
        let centroid = rings_centroid(&rings);
        let farthest = rings
            .iter()
            .flatten()
            .map(|&p| crate::geometry::dist2(p, centroid).sqrt())
            .fold(0.0_f64, f64::max);

        cmds.push(DrawCommand::SetMask { rings: rings.clone() });
        cmds.extend(pattern::generate_pattern(
            pattern_cfg,
            bounds,
            cell_size,
            cfg.color,
            shape.biome_id,
            centroid,
            farthest,
        ));
        cmds.push(DrawCommand::ClearMask);
    }

    cmds
}

/// Darkened-stroke draw calls for `BiomesMode::FancyDebug`: one closed
/// stroke per unexpanded-core outline, in the biome's own color darkened by
/// a fixed amount so the debug overlay reads on top of the normal fill.
pub fn debug_border_commands(grid: &Grid, resolver: &BiomeResolver) -> Vec<DrawCommand> {
    let mut cmds = Vec::new();
    for (biome_id, paths) in render_biome_debug_borders(grid, resolver) {
        let Some(cfg) = resolver.config(biome_id) else {
            continue;
        };
        let color = cfg.color.darken(DEBUG_BORDER_DARKEN);
        for path in paths {
            if path.points.len() < 2 {
                continue;
            }
            cmds.push(DrawCommand::Stroke {
                color,
                alpha: 1.0,
                width: DEBUG_BORDER_WIDTH,
                points: path.points,
                closed: path.closed,
            });
        }
    }
    cmds
}

fn rings_bounds(rings: &[Vec<Point>]) -> BiomeBounds {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(x, y) in rings.iter().flatten() {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    BiomeBounds { min_x, min_y, max_x, max_y }
}

fn rings_centroid(rings: &[Vec<Point>]) -> Point {
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut n = 0usize;
    for &(x, y) in rings.iter().flatten() {
        sx += x;
        sy += y;
        n += 1;
    }
    if n == 0 {
        (0.0, 0.0)
    } else {
        (sx / n as f64, sy / n as f64)
    }
}

/// The 8-neighborhood used for the one-ring expansion in step (b): spec
/// calls for 8-neighbors so a biome's fill also closes diagonal gaps at
/// four-biome corners, not just orthogonal ones.
fn neighbors8(row: usize, col: usize, rows: usize, cols: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(8);
    let row = row as isize;
    let col = col as isize;
    for dr in -1..=1isize {
        for dc in -1..=1isize {
            if dr == 0 && dc == 0 {
                continue;
            }
            let nr = row + dr;
            let nc = col + dc;
            if nr >= 0 && nc >= 0 && (nr as usize) < rows && (nc as usize) < cols {
                out.push((nr as usize, nc as usize));
            }
        }
    }
    out
}

/// Wrap a `rows x cols` boolean mask in a one-cell `false` border so that
/// biomes touching the grid edge still close into proper loops.
fn pad_mask(mask: &[bool], rows: usize, cols: usize) -> Vec<u8> {
    let padded_cols = cols + 2;
    let padded_rows = rows + 2;
    let mut out = vec![0u8; padded_rows * padded_cols];
    for r in 0..rows {
        for c in 0..cols {
            if mask[r * cols + c] {
                out[(r + 1) * padded_cols + (c + 1)] = 1;
            }
        }
    }
    out
}

/// Debug aid: per-cell biome-id boundary map, useful for visualizing raw
/// classification without the contour pipeline.
pub fn biome_id_counts(grid: &Grid, resolver: &BiomeResolver) -> BTreeMap<u8, usize> {
    let ids = resolver.resolve_grid(grid);
    let mut counts = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome_resolver::{BiomeConfig, BIOME_DESERT, BIOME_OCEAN};
    use crate::grid::Grid;
    use std::collections::BTreeMap;

    fn two_biome_grid() -> Grid {
        // 4x4 grid split left/right between ocean and desert.
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
    fn two_biomes_each_get_a_shape() {
        let grid = two_biome_grid();
        let mut configs = BTreeMap::new();
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        let resolver = BiomeResolver::new(configs);

        let shapes = render_biome_regions(&grid, &resolver);
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].biome_id, BIOME_OCEAN);
        assert_eq!(shapes[1].biome_id, BIOME_DESERT);
        assert!(shapes.iter().all(|s| !s.outlines.is_empty()));
    }

    #[test]
    fn lower_rank_biome_claims_contested_cells_first() {
        let grid = two_biome_grid();
        let mut configs = BTreeMap::new();
        // Desert now ranks before ocean; it should paint its one-ring
        // expansion into ocean territory before ocean is processed.
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 0));
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 1));
        let resolver = BiomeResolver::new(configs);

        let shapes = render_biome_regions(&grid, &resolver);
        assert_eq!(shapes[0].biome_id, BIOME_DESERT);
    }

    #[test]
    fn shapes_without_pattern_emit_single_fill() {
        let grid = two_biome_grid();
        let mut configs = BTreeMap::new();
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        let resolver = BiomeResolver::new(configs);

        let shapes = render_biome_regions(&grid, &resolver);
        let cmds = shape_to_draw_commands(&shapes[0], &resolver, grid.cell_size);
        assert_eq!(cmds.len(), 1);
        assert!(matches!(cmds[0], crate::draw::DrawCommand::Fill { .. }));
    }

    #[test]
    fn disabled_biome_is_skipped() {
        let grid = two_biome_grid();
        let mut configs = BTreeMap::new();
        let mut ocean = BiomeConfig::new("Ocean", 0x1d4e89, 0);
        ocean.enabled = false;
        configs.insert(BIOME_OCEAN, ocean);
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        let resolver = BiomeResolver::new(configs);

        let shapes = render_biome_regions(&grid, &resolver);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].biome_id, BIOME_DESERT);
    }

    #[test]
    fn debug_borders_trace_unexpanded_core_only() {
        let grid = two_biome_grid();
        let mut configs = BTreeMap::new();
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        let resolver = BiomeResolver::new(configs);

        let borders = render_biome_debug_borders(&grid, &resolver);
        assert_eq!(borders.len(), 2);
        assert!(borders.iter().all(|(_, paths)| !paths.is_empty()));

        let cmds = debug_border_commands(&grid, &resolver);
        assert!(!cmds.is_empty());
        assert!(cmds.iter().all(|c| matches!(c, DrawCommand::Stroke { .. })));
    }

    #[test]
    fn lone_speckle_cell_does_not_produce_its_own_shape() {
        // 5x5 ocean with a single stray desert cell; the region filter
        // should erase the speckle before marching squares ever sees it.
        let mut grid = Grid::flat(5, 5, 10.0);
        let idx = grid.index(2, 2);
        grid.biomes[idx] = BIOME_DESERT;
        let mut configs = BTreeMap::new();
        configs.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        configs.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 1));
        let resolver = BiomeResolver::new(configs);

        let shapes = render_biome_regions(&grid, &resolver);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].biome_id, BIOME_OCEAN);
    }
}
