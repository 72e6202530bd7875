//! Color helpers shared by the biome, pattern and height-contour renderers.
//!
//! Grounded in `export.rs`'s direct `[u8; 3]` colormap work in the teacher:
//! this crate keeps the same plain-tuple representation rather than pulling
//! in a color-management crate the teacher never reaches for.

/// 24-bit RGB color, stored the way `BiomeConfig::color` is specified
/// (a packed 0xRRGGBB value) but unpacked for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_hex(hex: u32) -> Self {
        Rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    pub fn to_hex(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }

    /// Darken by `factor` in `[0,1]`: 0 leaves the color unchanged, 1 yields black.
    pub fn darken(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        let scale = 1.0 - f;
        Rgb(
            (self.0 as f32 * scale).round() as u8,
            (self.1 as f32 * scale).round() as u8,
            (self.2 as f32 * scale).round() as u8,
        )
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let l = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(l(self.0, other.0), l(self.1, other.1), l(self.2, other.2))
    }
}

/// Height-contour color ramp: blue -> green -> yellow -> orange -> red,
/// matching the four-segment ramp in spec.md's HeightContourRenderer.
pub fn height_contour_color(t: f32) -> Rgb {
    const BLUE: Rgb = Rgb(40, 90, 220);
    const GREEN: Rgb = Rgb(60, 170, 70);
    const YELLOW: Rgb = Rgb(230, 210, 50);
    const ORANGE: Rgb = Rgb(230, 140, 40);
    const RED: Rgb = Rgb(200, 40, 40);

    let t = t.clamp(0.0, 1.0);
    if t < 0.25 {
        BLUE.lerp(GREEN, t / 0.25)
    } else if t < 0.5 {
        GREEN.lerp(YELLOW, (t - 0.25) / 0.25)
    } else if t < 0.75 {
        YELLOW.lerp(ORANGE, (t - 0.5) / 0.25)
    } else {
        ORANGE.lerp(RED, (t - 0.75) / 0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let c = Rgb::from_hex(0x112233);
        assert_eq!(c, Rgb(0x11, 0x22, 0x33));
        assert_eq!(c.to_hex(), 0x112233);
    }

    #[test]
    fn darken_zero_is_identity() {
        let c = Rgb(100, 150, 200);
        assert_eq!(c.darken(0.0), c);
    }

    #[test]
    fn darken_one_is_black() {
        let c = Rgb(100, 150, 200);
        assert_eq!(c.darken(1.0), Rgb(0, 0, 0));
    }

    #[test]
    fn contour_color_endpoints() {
        assert_eq!(height_contour_color(0.0), Rgb(40, 90, 220));
        assert_eq!(height_contour_color(1.0), Rgb(200, 40, 40));
    }
}
