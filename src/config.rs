//! World-map settings aggregate (ambient stack, SPEC_FULL.md §9).
//!
//! Grounded in the teacher's `menu.rs` (`WorldConfig`-style aggregate with
//! a `Default` impl and a builder-ish set of `with_*` methods) and
//! `erosion/params.rs` (`ErosionParams`) rather than a config-file crate
//! like `figment`/`config`, which the teacher never reaches for.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightsMode {
    ContoursBw,
    Contours,
    Cells,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BiomesMode {
    Fancy,
    FancyDebug,
    Cells,
    Off,
}

#[derive(Debug, Clone)]
pub struct WorldMapConfig {
    pub rotate_river_labels: bool,
    pub appearance_animation: bool,
    pub appearance_animation_duration_ms: u32,
    pub height_contour_alpha: f32,
    pub global_smooth_strength: f32,
    pub heights_mode: HeightsMode,
    pub biomes_mode: BiomesMode,
}

impl Default for WorldMapConfig {
    fn default() -> Self {
        WorldMapConfig {
            rotate_river_labels: true,
            appearance_animation: true,
            appearance_animation_duration_ms: 180,
            height_contour_alpha: 0.8,
            global_smooth_strength: 1.0,
            heights_mode: HeightsMode::Contours,
            biomes_mode: BiomesMode::Fancy,
        }
    }
}

impl WorldMapConfig {
    pub fn with_height_contour_alpha(mut self, alpha: f32) -> Self {
        self.height_contour_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_global_smooth_strength(mut self, strength: f32) -> Self {
        self.global_smooth_strength = strength.clamp(0.1, 1.0);
        self
    }

    pub fn with_appearance_animation_duration_ms(mut self, ms: u32) -> Self {
        self.appearance_animation_duration_ms = ms.clamp(0, 2000);
        self
    }

    pub fn with_rotate_river_labels(mut self, enabled: bool) -> Self {
        self.rotate_river_labels = enabled;
        self
    }

    pub fn with_appearance_animation(mut self, enabled: bool) -> Self {
        self.appearance_animation = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = WorldMapConfig::default();
        assert!(cfg.rotate_river_labels);
        assert!(cfg.appearance_animation);
        assert_eq!(cfg.appearance_animation_duration_ms, 180);
        assert_eq!(cfg.height_contour_alpha, 0.8);
        assert_eq!(cfg.global_smooth_strength, 1.0);
    }

    #[test]
    fn builders_clamp_to_documented_ranges() {
        let cfg = WorldMapConfig::default()
            .with_height_contour_alpha(5.0)
            .with_global_smooth_strength(0.0)
            .with_appearance_animation_duration_ms(5000);
        assert_eq!(cfg.height_contour_alpha, 1.0);
        assert_eq!(cfg.global_smooth_strength, 0.1);
        assert_eq!(cfg.appearance_animation_duration_ms, 2000);
    }
}
