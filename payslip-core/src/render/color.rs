use std::sync::OnceLock;

use regex::Regex;

/// An sRGB colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BRAND_GREEN: Rgb = Rgb::new(22, 163, 74);
    pub const DEDUCTION_RED: Rgb = Rgb::new(220, 38, 38);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const INK: Rgb = Rgb::new(40, 40, 40);
    pub const BODY: Rgb = Rgb::new(60, 60, 60);
    pub const MUTED: Rgb = Rgb::new(100, 100, 100);
    pub const FAINT: Rgb = Rgb::new(150, 150, 150);
    pub const RULE: Rgb = Rgb::new(200, 200, 200);
    pub const PANEL: Rgb = Rgb::new(248, 250, 252);
    pub const PANEL_BORDER: Rgb = Rgb::new(226, 232, 240);

    pub const fn new(
        r: u8,
        g: u8,
        b: u8,
    ) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the `#` is optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"(?i)^#?([a-f\d]{2})([a-f\d]{2})([a-f\d]{2})$")
                .expect("hex colour pattern is valid")
        });

        let captures = pattern.captures(hex.trim())?;
        let channel = |i: usize| u8::from_str_radix(&captures[i], 16).ok();
        Some(Self::new(channel(1)?, channel(2)?, channel(3)?))
    }

    /// The brand colour to draw with: the parsed hex, or the default green
    /// when the value is absent or malformed.
    pub fn brand(hex: Option<&str>) -> Self {
        hex.and_then(Self::from_hex).unwrap_or(Self::BRAND_GREEN)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn to_unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(Rgb::from_hex("#16a34a"), Some(Rgb::new(22, 163, 74)));
        assert_eq!(Rgb::from_hex("FF0000"), Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn rejects_short_and_invalid_hex() {
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("blue"), None);
    }

    #[test]
    fn brand_falls_back_to_green() {
        assert_eq!(Rgb::brand(None), Rgb::BRAND_GREEN);
        assert_eq!(Rgb::brand(Some("nonsense")), Rgb::BRAND_GREEN);
        assert_eq!(Rgb::brand(Some("#2563eb")), Rgb::new(37, 99, 235));
    }

    #[test]
    fn to_hex_is_lowercase() {
        assert_eq!(Rgb::new(22, 163, 74).to_hex(), "#16a34a");
    }

    #[test]
    fn to_unit_scales_channels() {
        assert_eq!(Rgb::WHITE.to_unit(), (1.0, 1.0, 1.0));
    }
}
