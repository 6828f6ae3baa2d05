//! Relative luminance of hex color codes and the white/black text decision.
//!
//! Luminance follows the W3C relative luminance definition
//! (<https://www.w3.org/TR/WCAG20/#relativeluminancedef>).

/// Contrast threshold: `sqrt(1.05 * 0.05) - 0.05`.
pub const WHITE_FONT_THRESHOLD: f64 = 0.17913;

pub const WHITE: &str = "#FFF";
pub const BLACK: &str = "#000";

/// Luma coefficients applied to the linearized channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Luma {
    /// ITU-R BT.709, the W3C recommendation.
    #[default]
    Rec709,
    /// CCIR 601 legacy weights.
    Ccir601,
}

impl Luma {
    fn weights(self) -> (f64, f64, f64) {
        match self {
            Luma::Rec709 => (0.2126, 0.7152, 0.0722),
            Luma::Ccir601 => (0.299, 0.587, 0.114),
        }
    }
}

/// Expand a hex code into its three 8-bit channels.
///
/// Accepts 1, 2, 3 or 6 hex digits with any number of leading `#`. Anything
/// else, including non-hex digits, reads as white.
fn rgb_from_hexcode(color: &str) -> [u8; 3] {
    const FALLBACK: [u8; 3] = [0xff, 0xff, 0xff];

    let hex = color.trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return FALLBACK;
    }

    let expanded = match hex.len() {
        1 => hex.repeat(6),
        2 => hex.repeat(3),
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return FALLBACK,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0xff);
    [channel(0), channel(2), channel(4)]
}

fn linearize(channel: u8) -> f64 {
    let value = f64::from(channel) / 255.0;
    if value <= 0.03928 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance in `[0, 1]` using BT.709 weights.
pub fn luminance(color: &str) -> f64 {
    luminance_with(color, Luma::Rec709)
}

pub fn luminance_with(color: &str, luma: Luma) -> f64 {
    let [r, g, b] = rgb_from_hexcode(color).map(linearize);
    let (wr, wg, wb) = luma.weights();
    wr * r + wg * g + wb * b
}

/// True when white text reads better than black on `color`.
pub fn use_white_font(color: &str) -> bool {
    luminance(color) <= WHITE_FONT_THRESHOLD
}

pub fn font_color(white: bool) -> &'static str {
    if white {
        WHITE
    } else {
        BLACK
    }
}
