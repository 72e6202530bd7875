//! World-map compositor core.
//!
//! Renders a fantasy world map as four layers drawn from one unified grid:
//! smoothed biome regions with optional decorative patterns, height
//! contours with downslope hachures, vector rivers, and vector regions with
//! labels and hover highlighting. A brush editor mutates the underlying
//! grid fields. See `compositor::Compositor` for the orchestration entry
//! point.

pub mod biome_renderer;
pub mod biome_resolver;
pub mod brush;
pub mod color;
pub mod compositor;
pub mod config;
pub mod diagnostics;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod height_contour;
pub mod pattern;
pub mod persistence;
pub mod river;
pub mod vector_region;
