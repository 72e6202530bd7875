//! Biome configuration and classification (component B).
//!
//! `BiomeConfig` mirrors the teacher's per-biome metadata
//! (`biomes.rs`'s `ExtendedBiome` catalogue, `map_export.rs`'s family/color
//! tables) but keyed by a plain `u8` id instead of a hand-enumerated enum,
//! since spec.md treats biome ids as opaque small integers supplied by the
//! grid or resolved from climate ordinals. Classification follows the
//! teacher's `climate::Biome::classify` shape (a cascading match on
//! elevation, then temperature, then moisture) adapted to the 1..6 ordinal
//! scale spec.md uses for moisture/temperature instead of continuous
//! Celsius/fraction values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Decorative fill pattern applied on top of a biome's solid color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternType {
    Diagonal,
    Crosshatch,
    Vertical,
    Horizontal,
    Dots,
    Circles,
    Waves,
    Hexagons,
    Spots,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub kind: PatternType,
    /// Explicit pattern color; if absent, derived by darkening the biome color.
    pub pattern_color: Option<Rgb>,
    /// How much to darken the base color when `pattern_color` is absent.
    pub darken_factor: f32,
    /// Multiplier of cell size.
    pub spacing: f32,
    /// Multiplier of cell size.
    pub line_width: f32,
    pub opacity: f32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            kind: PatternType::None,
            pattern_color: None,
            darken_factor: 0.35,
            spacing: 2.0,
            line_width: 0.6,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiomeConfig {
    pub name: String,
    pub color: Rgb,
    pub render_rank: i32,
    pub pattern: Option<PatternConfig>,
    pub enabled: bool,
}

impl BiomeConfig {
    pub fn new(name: &str, color: u32, render_rank: i32) -> Self {
        BiomeConfig {
            name: name.to_string(),
            color: Rgb::from_hex(color),
            render_rank,
            pattern: None,
            enabled: true,
        }
    }
}

/// A single override record from the persisted `BiomeOverrides` document
/// (spec.md §6). `None` fields are left untouched; `pattern: Some(None)`
/// explicitly clears a pattern, matching the document's `pattern?|null`.
#[derive(Debug, Clone, Default)]
pub struct BiomeOverride {
    pub id: u8,
    pub enabled: Option<bool>,
    pub name: Option<String>,
    pub color: Option<u32>,
    pub render_rank: Option<i32>,
    pub pattern: Option<Option<PatternConfig>>,
}

/// Maps per-cell climate ordinals (and optionally height) to a biome id,
/// and holds the merged (base + overrides) per-id configuration.
#[derive(Debug, Clone)]
pub struct BiomeResolver {
    configs: BTreeMap<u8, BiomeConfig>,
}

// Default biome ids produced by `classify`.
pub const BIOME_OCEAN: u8 = 0;
pub const BIOME_TUNDRA: u8 = 1;
pub const BIOME_BOREAL_FOREST: u8 = 2;
pub const BIOME_GRASSLAND: u8 = 3;
pub const BIOME_TEMPERATE_FOREST: u8 = 4;
pub const BIOME_TEMPERATE_RAINFOREST: u8 = 5;
pub const BIOME_DESERT: u8 = 6;
pub const BIOME_SAVANNA: u8 = 7;
pub const BIOME_TROPICAL_FOREST: u8 = 8;
pub const BIOME_ALPINE_TUNDRA: u8 = 9;
pub const BIOME_SNOWY_PEAKS: u8 = 10;

impl BiomeResolver {
    pub fn new(configs: BTreeMap<u8, BiomeConfig>) -> Self {
        BiomeResolver { configs }
    }

    /// The resolver's built-in default catalogue, covering the ids `classify`
    /// can produce. A host normally layers `BiomeOverrides` on top of this
    /// via `apply_overrides`.
    pub fn default_catalogue() -> BTreeMap<u8, BiomeConfig> {
        let mut m = BTreeMap::new();
        m.insert(BIOME_OCEAN, BiomeConfig::new("Ocean", 0x1d4e89, 0));
        m.insert(BIOME_TUNDRA, BiomeConfig::new("Tundra", 0xb8c4b0, 1));
        m.insert(
            BIOME_BOREAL_FOREST,
            BiomeConfig::new("Boreal Forest", 0x335533, 2),
        );
        m.insert(BIOME_GRASSLAND, BiomeConfig::new("Grassland", 0x8cb369, 3));
        m.insert(
            BIOME_TEMPERATE_FOREST,
            BiomeConfig::new("Temperate Forest", 0x3f6b35, 4),
        );
        m.insert(
            BIOME_TEMPERATE_RAINFOREST,
            BiomeConfig::new("Temperate Rainforest", 0x2a5c2a, 5),
        );
        m.insert(BIOME_DESERT, BiomeConfig::new("Desert", 0xd9b36a, 6));
        m.insert(BIOME_SAVANNA, BiomeConfig::new("Savanna", 0xc2a25a, 7));
        m.insert(
            BIOME_TROPICAL_FOREST,
            BiomeConfig::new("Tropical Forest", 0x1f7a3f, 8),
        );
        m.insert(
            BIOME_ALPINE_TUNDRA,
            BiomeConfig::new("Alpine Tundra", 0x9aa39a, 9),
        );
        m.insert(
            BIOME_SNOWY_PEAKS,
            BiomeConfig::new("Snowy Peaks", 0xf0f4ff, 10),
        );
        m
    }

    pub fn with_defaults() -> Self {
        Self::new(Self::default_catalogue())
    }

    /// Apply a layer of overrides deterministically: later entries in
    /// `overrides` win for a given id, and fields left `None` keep the
    /// prior (base or earlier-override) value.
    pub fn apply_overrides(&mut self, overrides: &[BiomeOverride]) {
        for ov in overrides {
            let entry = self
                .configs
                .entry(ov.id)
                .or_insert_with(|| BiomeConfig::new("Unnamed", 0x808080, i32::MAX));
            if let Some(enabled) = ov.enabled {
                entry.enabled = enabled;
            }
            if let Some(name) = &ov.name {
                entry.name = name.clone();
            }
            if let Some(color) = ov.color {
                entry.color = Rgb::from_hex(color);
            }
            if let Some(rank) = ov.render_rank {
                entry.render_rank = rank;
            }
            if let Some(pattern) = &ov.pattern {
                entry.pattern = *pattern;
            }
        }
    }

    pub fn config(&self, biome_id: u8) -> Option<&BiomeConfig> {
        self.configs.get(&biome_id)
    }

    pub fn configs(&self) -> &BTreeMap<u8, BiomeConfig> {
        &self.configs
    }

    /// Classify a cell from its moisture/temperature ordinals (1..6 typical)
    /// and optional elevation. Height takes priority (ocean, then alpine
    /// bands), then temperature bands, then moisture within a band —
    /// the same cascade shape as the teacher's `Biome::classify`, just over
    /// ordinals instead of continuous units.
    pub fn classify(moisture: u8, temperature: u8, height: Option<f32>) -> u8 {
        if let Some(h) = height {
            if h <= 0.0 {
                return BIOME_OCEAN;
            }
            if h > 80.0 {
                return if temperature <= 2 {
                    BIOME_SNOWY_PEAKS
                } else {
                    BIOME_ALPINE_TUNDRA
                };
            }
        }

        match temperature {
            1 => BIOME_TUNDRA,
            2 => {
                if moisture >= 4 {
                    BIOME_BOREAL_FOREST
                } else {
                    BIOME_TUNDRA
                }
            }
            3 | 4 => {
                if moisture >= 5 {
                    BIOME_TEMPERATE_RAINFOREST
                } else if moisture >= 3 {
                    BIOME_TEMPERATE_FOREST
                } else {
                    BIOME_GRASSLAND
                }
            }
            _ => {
                if moisture >= 5 {
                    BIOME_TROPICAL_FOREST
                } else if moisture >= 3 {
                    BIOME_SAVANNA
                } else {
                    BIOME_DESERT
                }
            }
        }
    }

    /// Resolve the full per-cell biome-id array for a grid: uses
    /// `grid.biomes` directly when it already has the right length
    /// (biomes authoritative), else classifies from moisture/temperature/height.
    pub fn resolve_grid(&self, grid: &crate::grid::Grid) -> Vec<u8> {
        let expected = grid.rows * grid.cols;
        if grid.biomes.len() == expected {
            return grid.biomes.clone();
        }
        (0..expected)
            .map(|i| Self::classify(grid.moisture[i], grid.temperature[i], Some(grid.heights[i])))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocean_wins_over_climate() {
        assert_eq!(BiomeResolver::classify(6, 6, Some(-5.0)), BIOME_OCEAN);
    }

    #[test]
    fn overrides_apply_deterministically() {
        let mut resolver = BiomeResolver::with_defaults();
        resolver.apply_overrides(&[
            BiomeOverride {
                id: BIOME_DESERT,
                color: Some(0x000000),
                ..Default::default()
            },
            BiomeOverride {
                id: BIOME_DESERT,
                render_rank: Some(42),
                ..Default::default()
            },
        ]);
        let cfg = resolver.config(BIOME_DESERT).unwrap();
        assert_eq!(cfg.color, Rgb(0, 0, 0));
        assert_eq!(cfg.render_rank, 42);
    }

    #[test]
    fn pattern_override_can_clear() {
        let mut resolver = BiomeResolver::with_defaults();
        resolver.apply_overrides(&[BiomeOverride {
            id: BIOME_DESERT,
            pattern: Some(Some(PatternConfig {
                kind: PatternType::Dots,
                ..Default::default()
            })),
            ..Default::default()
        }]);
        assert!(resolver.config(BIOME_DESERT).unwrap().pattern.is_some());

        resolver.apply_overrides(&[BiomeOverride {
            id: BIOME_DESERT,
            pattern: Some(None),
            ..Default::default()
        }]);
        assert!(resolver.config(BIOME_DESERT).unwrap().pattern.is_none());
    }
}
