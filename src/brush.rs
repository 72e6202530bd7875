//! Overlay-based brush editing (component K).
//!
//! A stroke accumulates into per-stroke overlays rather than mutating the
//! grid directly, so repeated passes over the same cell within one stroke
//! stay monotonic; the overlay is only applied to the grid atomically at
//! commit. Grounded in the teacher's `erosion/mod.rs` orchestration style
//! (a params struct driving a multi-phase mutation with a snapshot taken up
//! front) for the commit-time smooth/roughen passes, which need a
//! pre-stroke height snapshot to average against.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::diagnostics::{DiagnosticLog, Layer};
use crate::error::MapError;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushTool {
    Raise,
    Lower,
    Flatten,
    Smooth,
    Roughen,
    RaiseTemperature,
    LowerTemperature,
    RaiseMoisture,
    LowerMoisture,
    SetTemperature,
    SetMoisture,
}

pub struct BrushStroke {
    rows: usize,
    cols: usize,
    height_delta: Vec<f32>,
    temp_delta: Vec<i32>,
    moist_delta: Vec<i32>,
    affected: Vec<bool>,
    affected_order: Vec<usize>,
    /// Tool applications recorded for commit-time processing (smooth,
    /// roughen, and the discrete temp/moisture ops).
    deferred: Vec<(usize, BrushTool, f64, Option<u8>)>,
    grid_version: u64,
}

impl BrushStroke {
    pub fn open(grid: &Grid, grid_version: u64) -> Self {
        let n = grid.rows * grid.cols;
        BrushStroke {
            rows: grid.rows,
            cols: grid.cols,
            height_delta: vec![0.0; n],
            temp_delta: vec![0; n],
            moist_delta: vec![0; n],
            affected: vec![false; n],
            affected_order: Vec::new(),
            deferred: Vec::new(),
            grid_version,
        }
    }

    fn mark_affected(&mut self, idx: usize) {
        if !self.affected[idx] {
            self.affected[idx] = true;
            self.affected_order.push(idx);
        }
    }

    /// Apply one brush dab at `(world_x, world_y)` with the given radius
    /// (world units) and strength in `[0,1]`. `target` is used by `Flatten`
    /// (target height) and `SetTemperature`/`SetMoisture` (target ordinal).
    pub fn apply(
        &mut self,
        grid: &Grid,
        tool: BrushTool,
        world_x: f64,
        world_y: f64,
        brush_radius: f64,
        brush_strength: f64,
        target: f64,
    ) {
        let (gcol, grow) = grid.world_to_grid(world_x, world_y);
        let radius_cells = (brush_radius / grid.cell_size).max(1e-6);

        let c0 = (gcol - radius_cells).floor().max(0.0) as i64;
        let c1 = (gcol + radius_cells).ceil().min((self.cols - 1) as f64) as i64;
        let r0 = (grow - radius_cells).floor().max(0.0) as i64;
        let r1 = (grow + radius_cells).ceil().min((self.rows - 1) as f64) as i64;

        for row in r0.max(0)..=r1.max(r0) {
            for col in c0.max(0)..=c1.max(c0) {
                let dx = col as f64 - gcol;
                let dy = row as f64 - grow;
                let d = (dx * dx + dy * dy).sqrt();
                if d > radius_cells {
                    continue;
                }
                let falloff = 1.0 - d / radius_cells;
                let strength = (falloff * brush_strength).clamp(0.0, 1.0);
                let idx = (row as usize) * self.cols + col as usize;
                self.mark_affected(idx);

                match tool {
                    BrushTool::Raise => self.height_delta[idx] += (5.0 * strength) as f32,
                    BrushTool::Lower => self.height_delta[idx] -= (5.0 * strength) as f32,
                    BrushTool::Flatten => {
                        let h = grid.heights[idx] as f64 + self.height_delta[idx] as f64;
                        self.height_delta[idx] += ((target - h) * strength) as f32;
                    }
                    BrushTool::Smooth | BrushTool::Roughen => {
                        self.deferred.push((idx, tool, strength, None));
                    }
                    BrushTool::RaiseTemperature
                    | BrushTool::LowerTemperature
                    | BrushTool::RaiseMoisture
                    | BrushTool::LowerMoisture => {
                        self.deferred.push((idx, tool, strength, None));
                    }
                    BrushTool::SetTemperature | BrushTool::SetMoisture => {
                        self.deferred.push((idx, tool, strength, Some(target as u8)));
                    }
                }
            }
        }
    }

    /// Apply the accumulated overlay to `grid`. Returns `Err` without
    /// mutating the grid if `current_version` no longer matches the
    /// version the stroke was opened against (grid was replaced mid-stroke).
    pub fn commit(
        self,
        grid: &mut Grid,
        current_version: u64,
        brush_strength: f64,
        log: &mut DiagnosticLog,
    ) -> Result<(), MapError> {
        if current_version != self.grid_version {
            log.push(Layer::Export, MapError::Import("stroke aborted: grid replaced mid-stroke".into()));
            return Ok(());
        }

        let snapshot = grid.heights.clone();
        let mut height_delta = self.height_delta;
        let mut rng = StdRng::seed_from_u64(self.grid_version ^ 0x5eed);

        for &(idx, tool, strength, target) in &self.deferred {
            let row = idx / self.cols;
            let col = idx % self.cols;
            match tool {
                BrushTool::Smooth => {
                    let avg = neighborhood_average(&snapshot, self.rows, self.cols, row, col);
                    height_delta[idx] += ((avg as f64 - snapshot[idx] as f64) * 0.5 * brush_strength) as f32;
                }
                BrushTool::Roughen => {
                    let avg = neighborhood_average(&snapshot, self.rows, self.cols, row, col);
                    let jitter: f64 = rng.gen_range(-1.0..1.0);
                    let delta = (snapshot[idx] as f64 - avg as f64) * 0.3 * strength
                        + jitter * 0.4 * strength;
                    height_delta[idx] += delta as f32;
                }
                BrushTool::RaiseTemperature => {
                    grid.temperature[idx] = (grid.temperature[idx] as i32 + 1).clamp(1, 5) as u8;
                }
                BrushTool::LowerTemperature => {
                    grid.temperature[idx] = (grid.temperature[idx] as i32 - 1).clamp(1, 5) as u8;
                }
                BrushTool::RaiseMoisture => {
                    grid.moisture[idx] = (grid.moisture[idx] as i32 + 1).clamp(1, 5) as u8;
                }
                BrushTool::LowerMoisture => {
                    grid.moisture[idx] = (grid.moisture[idx] as i32 - 1).clamp(1, 5) as u8;
                }
                BrushTool::SetTemperature => {
                    if let Some(t) = target {
                        grid.temperature[idx] = t.clamp(1, 5);
                    }
                }
                BrushTool::SetMoisture => {
                    if let Some(t) = target {
                        grid.moisture[idx] = t.clamp(1, 5);
                    }
                }
                BrushTool::Raise | BrushTool::Lower | BrushTool::Flatten => unreachable!(
                    "immediate tools are applied in `apply`, never deferred"
                ),
            }
        }

        for &idx in &self.affected_order {
            grid.heights[idx] = (grid.heights[idx] + height_delta[idx]).max(0.0);
        }

        Ok(())
    }
}

fn neighborhood_average(heights: &[f32], rows: usize, cols: usize, row: usize, col: usize) -> f32 {
    let mut sum = 0.0;
    let mut count = 0;
    for dr in -1i64..=1 {
        for dc in -1i64..=1 {
            let r = row as i64 + dr;
            let c = col as i64 + dc;
            if r < 0 || c < 0 || r as usize >= rows || c as usize >= cols {
                continue;
            }
            sum += heights[r as usize * cols + c as usize];
            count += 1;
        }
    }
    if count == 0 {
        heights[row * cols + col]
    } else {
        sum / count as f32
    }
}

/// Whole-grid smoothing outside of a stroke: `k` passes of 3x3 averaging,
/// blended into the existing heights by `global_strength`.
pub fn global_smooth(grid: &mut Grid, iterations: usize, global_strength: f64) {
    let global_strength = global_strength.clamp(0.0, 1.0);
    for _ in 0..iterations {
        let snapshot = grid.heights.clone();
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let idx = grid.index(row, col);
                let avg = neighborhood_average(&snapshot, grid.rows, grid.cols, row, col);
                let blended = snapshot[idx] as f64 * (1.0 - global_strength) + avg as f64 * global_strength;
                grid.heights[idx] = (blended as f32).max(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_then_lower_round_trips() {
        let mut grid = Grid::flat(5, 5, 1.0);
        let mut log = DiagnosticLog::new();

        let mut stroke = BrushStroke::open(&grid, 1);
        stroke.apply(&grid, BrushTool::Raise, 2.0, 2.0, 3.0, 1.0, 0.0);
        stroke.commit(&mut grid, 1, 1.0, &mut log).unwrap();
        let raised = grid.heights[grid.index(2, 2)];
        assert!(raised > 0.0);

        let mut stroke = BrushStroke::open(&grid, 1);
        stroke.apply(&grid, BrushTool::Lower, 2.0, 2.0, 3.0, 1.0, 0.0);
        stroke.commit(&mut grid, 1, 1.0, &mut log).unwrap();
        let back = grid.heights[grid.index(2, 2)];
        assert!(back < raised);
    }

    #[test]
    fn commit_aborts_on_version_mismatch() {
        let mut grid = Grid::flat(5, 5, 1.0);
        let mut log = DiagnosticLog::new();
        let mut stroke = BrushStroke::open(&grid, 1);
        stroke.apply(&grid, BrushTool::Raise, 2.0, 2.0, 3.0, 1.0, 0.0);
        stroke.commit(&mut grid, 2, 1.0, &mut log).unwrap();
        assert_eq!(grid.heights[grid.index(2, 2)], 0.0);
        assert!(!log.is_empty());
    }

    #[test]
    fn heights_never_go_negative() {
        let mut grid = Grid::flat(5, 5, 1.0);
        let mut log = DiagnosticLog::new();
        let mut stroke = BrushStroke::open(&grid, 1);
        for _ in 0..10 {
            stroke.apply(&grid, BrushTool::Lower, 2.0, 2.0, 3.0, 1.0, 0.0);
        }
        stroke.commit(&mut grid, 1, 1.0, &mut log).unwrap();
        assert!(grid.heights.iter().all(|&h| h >= 0.0));
    }

    #[test]
    fn global_smooth_reduces_variance() {
        let mut grid = Grid::flat(8, 8, 1.0);
        for (i, h) in grid.heights.iter_mut().enumerate() {
            *h = if i % 2 == 0 { 0.0 } else { 100.0 };
        }
        let before_variance = variance(&grid.heights);
        global_smooth(&mut grid, 3, 1.0);
        let after_variance = variance(&grid.heights);
        assert!(after_variance < before_variance);
    }

    fn variance(values: &[f32]) -> f64 {
        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
        values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / values.len() as f64
    }
}
