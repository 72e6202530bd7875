//! Headless CLI front-end for the world-map compositor core.
//!
//! Drives `Compositor` exactly the way the library crate does, without any
//! host UI: it loads a grid (flat, or from a persisted scene's heights if
//! one isn't supplied), applies the requested commands in order, reports
//! diagnostics to stderr, and optionally writes an exported PNG. Grounded
//! in the teacher's `main.rs` (`clap`-derived `Args`, a flat pipeline of
//! "load, transform, maybe export" driven from `fn main`) adapted from one
//! flag struct to the subcommand table spec.md §6 describes conceptually.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use worldmap_compositor::brush::BrushTool;
use worldmap_compositor::compositor::Compositor;
use worldmap_compositor::config::{BiomesMode, HeightsMode};
use worldmap_compositor::diagnostics::DiagnosticLog;
use worldmap_compositor::grid::Grid;
use worldmap_compositor::persistence;

#[derive(Parser, Debug)]
#[command(name = "worldmap_compositor")]
#[command(about = "Render fantasy world maps from a unified grid of per-cell samples")]
struct Cli {
    /// Rows in a freshly generated flat grid.
    #[arg(long, default_value = "64")]
    rows: usize,

    /// Columns in a freshly generated flat grid.
    #[arg(long, default_value = "64")]
    cols: usize,

    /// World-space size of one grid cell.
    #[arg(long, default_value = "10.0")]
    cell_size: f64,

    /// Path to a persisted BiomeOverrides JSON document to layer over the defaults.
    #[arg(long)]
    biome_overrides: Option<PathBuf>,

    /// Path to a persisted VectorRivers JSON document.
    #[arg(long)]
    rivers: Option<PathBuf>,

    /// Path to a persisted VectorRegions JSON document.
    #[arg(long)]
    regions: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild the full scene and report how many draw commands each layer produced.
    Render,
    /// Set the height layer's render mode.
    SetHeightsMode {
        #[arg(value_enum)]
        mode: HeightsModeArg,
    },
    /// Set the biome layer's render mode.
    SetBiomesMode {
        #[arg(value_enum)]
        mode: BiomesModeArg,
    },
    /// Apply a single brush dab, commit it, and re-render.
    Brush {
        #[arg(value_enum)]
        tool: BrushToolArg,
        x: f64,
        y: f64,
        radius: f64,
        strength: f64,
        #[arg(default_value = "0.0")]
        target: f64,
    },
    /// Apply whole-grid smoothing.
    GlobalSmooth { iterations: usize },
    /// Render and export a PNG.
    Export {
        width: u32,
        height: u32,
        #[arg(default_value = "1.0")]
        scale: f64,
        #[arg(long, default_value = "4096")]
        max_dimension: u32,
        #[arg(long, default_value = "out.png")]
        output: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum HeightsModeArg {
    ContoursBw,
    Contours,
    Cells,
    Off,
}

impl From<HeightsModeArg> for HeightsMode {
    fn from(v: HeightsModeArg) -> Self {
        match v {
            HeightsModeArg::ContoursBw => HeightsMode::ContoursBw,
            HeightsModeArg::Contours => HeightsMode::Contours,
            HeightsModeArg::Cells => HeightsMode::Cells,
            HeightsModeArg::Off => HeightsMode::Off,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BiomesModeArg {
    Fancy,
    FancyDebug,
    Cells,
    Off,
}

impl From<BiomesModeArg> for BiomesMode {
    fn from(v: BiomesModeArg) -> Self {
        match v {
            BiomesModeArg::Fancy => BiomesMode::Fancy,
            BiomesModeArg::FancyDebug => BiomesMode::FancyDebug,
            BiomesModeArg::Cells => BiomesMode::Cells,
            BiomesModeArg::Off => BiomesMode::Off,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BrushToolArg {
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

impl From<BrushToolArg> for BrushTool {
    fn from(v: BrushToolArg) -> Self {
        match v {
            BrushToolArg::Raise => BrushTool::Raise,
            BrushToolArg::Lower => BrushTool::Lower,
            BrushToolArg::Flatten => BrushTool::Flatten,
            BrushToolArg::Smooth => BrushTool::Smooth,
            BrushToolArg::Roughen => BrushTool::Roughen,
            BrushToolArg::RaiseTemperature => BrushTool::RaiseTemperature,
            BrushToolArg::LowerTemperature => BrushTool::LowerTemperature,
            BrushToolArg::RaiseMoisture => BrushTool::RaiseMoisture,
            BrushToolArg::LowerMoisture => BrushTool::LowerMoisture,
            BrushToolArg::SetTemperature => BrushTool::SetTemperature,
            BrushToolArg::SetMoisture => BrushTool::SetMoisture,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut log = DiagnosticLog::new();
    let mut compositor = Compositor::new();

    compositor.set_grid(Grid::flat(cli.rows, cli.cols, cli.cell_size));

    if let Some(path) = &cli.biome_overrides {
        match persistence::load_biome_overrides(path) {
            Ok(overrides) => compositor.reload_biome_overrides(&overrides),
            Err(e) => eprintln!("warning: could not load biome overrides: {e}"),
        }
    }
    if let Some(path) = &cli.rivers {
        match persistence::load_vector_rivers(path) {
            Ok(rivers) => compositor.set_rivers(rivers),
            Err(e) => eprintln!("warning: could not load rivers: {e}"),
        }
    }
    if let Some(path) = &cli.regions {
        match persistence::load_vector_regions(path) {
            Ok(regions) => compositor.set_regions(regions),
            Err(e) => eprintln!("warning: could not load regions: {e}"),
        }
    }

    compositor.render(&mut log);

    match cli.command {
        Command::Render => {
            let scene = compositor.scene();
            println!(
                "biome_fills={} biome_patterns={} height_contours={} rivers={} regions={}",
                scene.biome_fills.len(),
                scene.biome_patterns.len(),
                scene.height_contours.len(),
                scene.rivers.len(),
                scene.regions.len(),
            );
        }
        Command::SetHeightsMode { mode } => {
            compositor.set_heights_mode(mode.into(), &mut log);
            println!("height_contours={}", compositor.scene().height_contours.len());
        }
        Command::SetBiomesMode { mode } => {
            compositor.set_biomes_mode(mode.into(), &mut log);
            println!("biome_fills={}", compositor.scene().biome_fills.len());
        }
        Command::Brush { tool, x, y, radius, strength, target } => {
            compositor.begin_brush_stroke(&mut log);
            compositor.apply_brush(tool.into(), x, y, radius, strength, target);
            if let Err(e) = compositor.commit_brush_stroke(strength, &mut log) {
                eprintln!("error: {e}");
            }
        }
        Command::GlobalSmooth { iterations } => {
            compositor.global_smooth(iterations, &mut log);
        }
        Command::Export { width, height, scale, max_dimension, output } => {
            match compositor.export_to_image(width, height, scale, max_dimension) {
                Ok(image) => {
                    if let Err(e) = image.save(&output) {
                        eprintln!("error: could not write {}: {e}", output.display());
                        std::process::exit(1);
                    }
                    println!("wrote {}", output.display());
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    log.report();
}
