// src/entity/palette.rs

/// A named swatch offered by the colour pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";
pub const DEFAULT_TEXT_COLOR: &str = "#333333";

pub const BACKGROUND_COLORS: &[ColorOption] = &[
    ColorOption { value: "#FFFFFF", label: "White" },
    ColorOption { value: "#F8F9FA", label: "Light Gray" },
    ColorOption { value: "#FFF8E1", label: "Cream" },
    ColorOption { value: "#E3F2FD", label: "Light Blue" },
    ColorOption { value: "#E8F5E9", label: "Light Green" },
    ColorOption { value: "#F3E5F5", label: "Light Purple" },
    ColorOption { value: "#FFF3E0", label: "Light Orange" },
    ColorOption { value: "#111111", label: "Black" },
];

pub const TEXT_COLORS: &[ColorOption] = &[
    ColorOption { value: "#000000", label: "Black" },
    ColorOption { value: "#333333", label: "Dark Gray" },
    ColorOption { value: "#0D47A1", label: "Blue" },
    ColorOption { value: "#1B5E20", label: "Green" },
    ColorOption { value: "#4A148C", label: "Purple" },
    ColorOption { value: "#E65100", label: "Orange" },
    ColorOption { value: "#B71C1C", label: "Red" },
    ColorOption { value: "#FFFFFF", label: "White" },
];

/// Map a palette label ("light blue", "Light-Blue") to its hex value.
/// Anything else, hex or not, is returned as given.
pub fn resolve_color(input: &str, palette: &[ColorOption]) -> String {
    let wanted = input.trim().to_lowercase().replace(['-', '_'], " ");
    palette
        .iter()
        .find(|c| c.label.to_lowercase() == wanted)
        .map(|c| c.value.to_string())
        .unwrap_or_else(|| input.trim().to_string())
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(Self::opaque(out[0], out[1], out[2]))
            }
            6 => Some(Self::opaque(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    /// Same colour with its alpha scaled by `opacity` (0.0..=1.0).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}
