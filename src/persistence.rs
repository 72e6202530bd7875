//! Persisted JSON schemas and load/save helpers (spec.md §6 persistence
//! adapter). Grounded in the teacher's serde-derived types (`biomes.rs`'s
//! `ExtendedBiome`, `water_bodies.rs`'s `WaterBodyId` both derive
//! `Serialize`/`Deserialize`) — this crate follows the same derive-first
//! approach rather than hand-rolling JSON parsing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biome_resolver::{BiomeOverride, PatternConfig};
use crate::error::MapError;
use crate::river::{RiverVertex, VectorRiver};
use crate::vector_region::VectorRegion;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeOverrideRecord {
    pub id: u8,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, rename = "renderRank")]
    pub render_rank: Option<i32>,
    #[serde(default)]
    pub pattern: Option<Option<PatternConfig>>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeOverridesDoc {
    pub version: u32,
    pub biomes: Vec<BiomeOverrideRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRiverSettings {
    #[serde(default, rename = "labelMode")]
    pub label_mode: String,
    #[serde(default, rename = "snapToEndpoints")]
    pub snap_to_endpoints: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverPointRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverRecord {
    pub id: u64,
    pub name: String,
    pub points: Vec<RiverPointRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRiversDoc {
    pub version: u32,
    pub settings: VectorRiverSettings,
    pub rivers: Vec<RiverRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRegionSettings {
    #[serde(default, rename = "labelMode")]
    pub label_mode: String,
    #[serde(default, rename = "renderMode")]
    pub render_mode: String,
    #[serde(default, rename = "smoothIterations")]
    pub smooth_iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRecord {
    pub id: u64,
    pub name: String,
    pub points: Vec<PointRecord>,
    pub closed: bool,
    #[serde(rename = "fillColor")]
    pub fill_color: String,
    #[serde(rename = "fillAlpha")]
    pub fill_alpha: f32,
    #[serde(rename = "strokeColor")]
    pub stroke_color: String,
    #[serde(rename = "strokeAlpha")]
    pub stroke_alpha: f32,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f32,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRegionsDoc {
    pub version: u32,
    pub settings: VectorRegionSettings,
    pub regions: Vec<RegionRecord>,
}

fn parse_hex_color(s: &str) -> Result<u32, MapError> {
    let trimmed = s.trim_start_matches('#');
    u32::from_str_radix(trimmed, 16).map_err(|_| MapError::Import(format!("invalid color: {s}")))
}

pub fn load_biome_overrides(path: &Path) -> Result<Vec<BiomeOverride>, MapError> {
    let text = fs::read_to_string(path).map_err(|e| MapError::Import(e.to_string()))?;
    let doc: BiomeOverridesDoc =
        serde_json::from_str(&text).map_err(|e| MapError::Import(e.to_string()))?;

    let mut overrides = Vec::with_capacity(doc.biomes.len());
    for record in doc.biomes {
        let color = match record.color {
            Some(hex) => match parse_hex_color(&hex) {
                Ok(c) => Some(c),
                Err(_) => continue, // skip this record, keep the rest (InvalidColor)
            },
            None => None,
        };
        overrides.push(BiomeOverride {
            id: record.id,
            enabled: record.enabled,
            name: record.name,
            color,
            render_rank: record.render_rank,
            pattern: record.pattern,
        });
    }
    Ok(overrides)
}

pub fn save_biome_overrides(path: &Path, doc: &BiomeOverridesDoc) -> Result<(), MapError> {
    let text = serde_json::to_string_pretty(doc).map_err(|e| MapError::Import(e.to_string()))?;
    fs::write(path, text).map_err(|e| MapError::Import(e.to_string()))
}

pub fn load_vector_rivers(path: &Path) -> Result<Vec<VectorRiver>, MapError> {
    let text = fs::read_to_string(path).map_err(|e| MapError::Import(e.to_string()))?;
    let doc: VectorRiversDoc =
        serde_json::from_str(&text).map_err(|e| MapError::Import(e.to_string()))?;

    let mut rivers = Vec::with_capacity(doc.rivers.len());
    for record in doc.rivers {
        if record.points.len() < 2 {
            continue; // InvalidPointList: skip, keep the rest
        }
        rivers.push(VectorRiver {
            id: record.id,
            name: record.name,
            vertices: record
                .points
                .into_iter()
                .map(|p| RiverVertex { point: (p.x, p.y), width: p.width })
                .collect(),
        });
    }
    Ok(rivers)
}

pub fn save_vector_rivers(path: &Path, doc: &VectorRiversDoc) -> Result<(), MapError> {
    let text = serde_json::to_string_pretty(doc).map_err(|e| MapError::Import(e.to_string()))?;
    fs::write(path, text).map_err(|e| MapError::Import(e.to_string()))
}

pub fn load_vector_regions(path: &Path) -> Result<Vec<VectorRegion>, MapError> {
    let text = fs::read_to_string(path).map_err(|e| MapError::Import(e.to_string()))?;
    let doc: VectorRegionsDoc =
        serde_json::from_str(&text).map_err(|e| MapError::Import(e.to_string()))?;

    let mut regions = Vec::with_capacity(doc.regions.len());
    for record in doc.regions {
        if record.points.len() < 2 {
            continue;
        }
        let (fill_color, stroke_color) = match (parse_hex_color(&record.fill_color), parse_hex_color(&record.stroke_color)) {
            (Ok(f), Ok(s)) => (f, s),
            _ => continue,
        };
        regions.push(VectorRegion {
            id: record.id,
            name: record.name,
            points: record.points.into_iter().map(|p| (p.x, p.y)).collect(),
            closed: record.closed,
            fill_color: crate::color::Rgb::from_hex(fill_color),
            fill_alpha: record.fill_alpha,
            stroke_color: crate::color::Rgb::from_hex(stroke_color),
            stroke_alpha: record.stroke_alpha,
            stroke_width: record.stroke_width,
        });
    }
    Ok(regions)
}

pub fn save_vector_regions(path: &Path, doc: &VectorRegionsDoc) -> Result<(), MapError> {
    let text = serde_json::to_string_pretty(doc).map_err(|e| MapError::Import(e.to_string()))?;
    fs::write(path, text).map_err(|e| MapError::Import(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_color_record_is_skipped_not_fatal() {
        let doc = BiomeOverridesDoc {
            version: 1,
            biomes: vec![
                BiomeOverrideRecord {
                    id: 1,
                    enabled: None,
                    name: None,
                    color: Some("not-a-color".to_string()),
                    render_rank: None,
                    pattern: None,
                    link: None,
                },
                BiomeOverrideRecord {
                    id: 2,
                    enabled: None,
                    name: None,
                    color: Some("ff0000".to_string()),
                    render_rank: None,
                    pattern: None,
                    link: None,
                },
            ],
        };
        let text = serde_json::to_string(&doc).unwrap();
        let dir = std::env::temp_dir().join("worldmap_compositor_test_overrides.json");
        fs::write(&dir, text).unwrap();

        let overrides = load_biome_overrides(&dir).unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].id, 2);

        let _ = fs::remove_file(&dir);
    }

    #[test]
    fn river_with_too_few_points_is_skipped() {
        let doc = VectorRiversDoc {
            version: 1,
            settings: VectorRiverSettings { label_mode: "auto".to_string(), snap_to_endpoints: true },
            rivers: vec![RiverRecord {
                id: 1,
                name: "Too Short".to_string(),
                points: vec![RiverPointRecord { x: 0.0, y: 0.0, width: 2.0 }],
            }],
        };
        let text = serde_json::to_string(&doc).unwrap();
        let path = std::env::temp_dir().join("worldmap_compositor_test_rivers.json");
        fs::write(&path, text).unwrap();

        let rivers = load_vector_rivers(&path).unwrap();
        assert!(rivers.is_empty());

        let _ = fs::remove_file(&path);
    }
}
