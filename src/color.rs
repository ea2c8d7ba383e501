//! Color model, palette tables, degradation, and SGR fragment emission.
//!
//! Colors come in four kinds ([`Color`]); degradation converts any color to
//! the nearest representable color at a target [`Profile`], never upgrading
//! fidelity. The 256-color palette and its fixed 256-to-16 correspondence
//! table are computed at compile time.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// SGR parameter selecting the foreground.
const FOREGROUND: &str = "38";
/// SGR parameter selecting the background.
const BACKGROUND: &str = "48";

/// A terminal color.
///
/// Values are immutable once constructed. Out-of-range `Ansi` indices are
/// accepted and passed through during rendering; palette lookups clamp
/// instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Terminal value for "unset": renders no codes at all.
    NoColor,
    /// One of the 16 standard/bright ANSI colors (0-15).
    Ansi(u8),
    /// An entry of the 256-color palette: 16 base colors, the 6x6x6 cube
    /// (16-231), and the grayscale ramp (232-255).
    Ansi256(u8),
    /// A 24-bit truecolor value.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Dispatch constructor from a color specification string.
    ///
    /// Decimal `0`-`15` becomes [`Color::Ansi`], `16`-`255` becomes
    /// [`Color::Ansi256`], a `#`-prefixed 3- or 6-digit hex string becomes
    /// [`Color::Rgb`] (short nibbles duplicated, case-insensitive), and
    /// anything unrecognized becomes [`Color::NoColor`]. Never fails.
    ///
    /// ## Examples
    ///
    /// ```
    /// use termstyle::Color;
    ///
    /// assert_eq!(Color::parse("9"), Color::Ansi(9));
    /// assert_eq!(Color::parse("196"), Color::Ansi256(196));
    /// assert_eq!(Color::parse("#F00"), Color::Rgb(255, 0, 0));
    /// assert_eq!(Color::parse("#ff0000"), Color::Rgb(255, 0, 0));
    /// assert_eq!(Color::parse("invalid"), Color::NoColor);
    /// ```
    pub fn parse(spec: &str) -> Color {
        if spec.is_empty() {
            return Color::NoColor;
        }
        if let Some(hex) = spec.strip_prefix('#') {
            return match parse_hex(hex) {
                Some((r, g, b)) => Color::Rgb(r, g, b),
                None => Color::NoColor,
            };
        }
        match spec.parse::<u32>() {
            Ok(index) if index < 16 => Color::Ansi(index as u8),
            Ok(index) if index < 256 => Color::Ansi256(index as u8),
            _ => Color::NoColor,
        }
    }

    /// Truecolor value from direct components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb(r, g, b)
    }

    /// Expand this color to its RGB triple via the palette.
    ///
    /// `Ansi` indices above 15 clamp to the nearest valid entry;
    /// [`Color::NoColor`] has no expansion.
    pub fn to_rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Color::NoColor => None,
            Color::Ansi(index) => Some(PALETTE[index.min(15) as usize]),
            Color::Ansi256(index) => Some(PALETTE[index as usize]),
            Color::Rgb(r, g, b) => Some((r, g, b)),
        }
    }

    /// The SGR fragment for this color, empty for [`Color::NoColor`].
    ///
    /// Foreground: `30+i` / `90+(i-8)` for ANSI, `38;5;i` for 256-color,
    /// `38;2;r;g;b` for truecolor. Background shifts the ANSI base by 10
    /// and uses `48` in place of `38`.
    pub fn sequence(self, background: bool) -> String {
        match self {
            Color::NoColor => String::new(),
            Color::Ansi(index) => {
                // u16 arithmetic so out-of-range indices pass through
                // without overflow.
                let index = u16::from(index);
                let base = if index < 8 { 30 + index } else { 90 + (index - 8) };
                let base = if background { base + 10 } else { base };
                base.to_string()
            }
            Color::Ansi256(index) => {
                let prefix = if background { BACKGROUND } else { FOREGROUND };
                format!("{prefix};5;{index}")
            }
            Color::Rgb(r, g, b) => {
                let prefix = if background { BACKGROUND } else { FOREGROUND };
                format!("{prefix};2;{r};{g};{b}")
            }
        }
    }
}

impl From<&str> for Color {
    fn from(spec: &str) -> Self {
        Color::parse(spec)
    }
}

impl std::fmt::Display for Color {
    /// Hex notation of the palette expansion; empty for `NoColor`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some((r, g, b)) = self.to_rgb() {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            Ok(())
        }
    }
}

impl Profile {
    /// Degrade `color` to the nearest color representable at this profile.
    ///
    /// Pure and total: never raises, never upgrades fidelity. Degradation
    /// is idempotent and composes across the profile order (degrading
    /// step-by-step equals degrading directly).
    ///
    /// ## Examples
    ///
    /// ```
    /// use termstyle::{Color, Profile};
    ///
    /// assert_eq!(
    ///     Profile::Ansi256.convert(Color::Rgb(255, 0, 0)),
    ///     Color::Ansi256(196)
    /// );
    /// assert_eq!(Profile::Ascii.convert(Color::Rgb(255, 0, 0)), Color::NoColor);
    /// ```
    pub fn convert(self, color: Color) -> Color {
        match (self, color) {
            (Profile::Ascii, _) | (_, Color::NoColor) => Color::NoColor,
            (_, Color::Ansi(_)) => color,
            (Profile::Ansi16, Color::Ansi256(index)) => {
                Color::Ansi(ANSI256_TO_16[index as usize])
            }
            (_, Color::Ansi256(_)) => color,
            (Profile::TrueColor, Color::Rgb(..)) => color,
            (profile, Color::Rgb(r, g, b)) => {
                let index = nearest_ansi256(r, g, b);
                if profile == Profile::Ansi16 {
                    Color::Ansi(ANSI256_TO_16[index as usize])
                } else {
                    Color::Ansi256(index)
                }
            }
        }
    }
}

/// Parse 3- or 6-digit hex, short nibbles duplicated (`F00` -> `FF0000`).
fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits: Vec<u32> = hex
        .chars()
        .map(|c| c.to_digit(16))
        .collect::<Option<Vec<u32>>>()?;
    match digits.len() {
        3 => Some((
            (digits[0] * 17) as u8,
            (digits[1] * 17) as u8,
            (digits[2] * 17) as u8,
        )),
        6 => Some((
            ((digits[0] << 4) | digits[1]) as u8,
            ((digits[2] << 4) | digits[3]) as u8,
            ((digits[4] << 4) | digits[5]) as u8,
        )),
        _ => None,
    }
}

/// RGB expansion of the 16 standard/bright colors (xterm defaults).
const BASE16: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // black
    (128, 0, 0),     // red
    (0, 128, 0),     // green
    (128, 128, 0),   // yellow
    (0, 0, 128),     // blue
    (128, 0, 128),   // magenta
    (0, 128, 128),   // cyan
    (192, 192, 192), // white
    (128, 128, 128), // bright black
    (255, 0, 0),     // bright red
    (0, 255, 0),     // bright green
    (255, 255, 0),   // bright yellow
    (0, 0, 255),     // bright blue
    (255, 0, 255),   // bright magenta
    (0, 255, 255),   // bright cyan
    (255, 255, 255), // bright white
];

/// Channel values of the 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// RGB expansion of the full 256-color palette.
pub(crate) const PALETTE: [(u8, u8, u8); 256] = build_palette();

const fn build_palette() -> [(u8, u8, u8); 256] {
    let mut palette = [(0u8, 0u8, 0u8); 256];
    let mut i = 0;
    while i < 16 {
        palette[i] = BASE16[i];
        i += 1;
    }
    while i < 232 {
        let n = i - 16;
        palette[i] = (
            CUBE_LEVELS[n / 36],
            CUBE_LEVELS[(n / 6) % 6],
            CUBE_LEVELS[n % 6],
        );
        i += 1;
    }
    while i < 256 {
        let v = (8 + 10 * (i - 232)) as u8;
        palette[i] = (v, v, v);
        i += 1;
    }
    palette
}

/// Fixed 256-to-16 correspondence: each palette entry pre-assigned to the
/// base color minimizing Euclidean distance, ties to the lowest index.
pub(crate) const ANSI256_TO_16: [u8; 256] = build_correspondence();

const fn build_correspondence() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut best = 0;
        let mut best_distance = i32::MAX;
        let mut candidate = 0;
        while candidate < 16 {
            let distance = squared_distance(PALETTE[i], BASE16[candidate]);
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
            candidate += 1;
        }
        table[i] = best as u8;
        i += 1;
    }
    table
}

const fn squared_distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

/// Nearest cube/grayscale palette index (16-255) by Euclidean distance,
/// ties to the lowest index.
///
/// The base 16 entries are excluded: their actual rendering is
/// theme-dependent, so degradation never produces them.
fn nearest_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let mut best = 16u16;
    let mut best_distance = i32::MAX;
    for index in 16..=255u16 {
        let distance = squared_distance((r, g, b), PALETTE[index as usize]);
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatch() {
        assert_eq!(Color::parse("0"), Color::Ansi(0));
        assert_eq!(Color::parse("15"), Color::Ansi(15));
        assert_eq!(Color::parse("16"), Color::Ansi256(16));
        assert_eq!(Color::parse("255"), Color::Ansi256(255));
        assert_eq!(Color::parse("256"), Color::NoColor);
        assert_eq!(Color::parse("-1"), Color::NoColor);
    }

    #[test]
    fn test_parse_hex_short_equals_long() {
        assert_eq!(Color::parse("#F00"), Color::parse("#FF0000"));
        assert_eq!(Color::parse("#abc"), Color::Rgb(0xaa, 0xbb, 0xcc));
        assert_eq!(Color::parse("#AbCdEf"), Color::Rgb(0xab, 0xcd, 0xef));
    }

    #[test]
    fn test_parse_invalid_specs_degrade_to_no_color() {
        for spec in ["", "invalid", "#ZZZZZZ", "#12345", "#1234567", "#", "1.5"] {
            assert_eq!(Color::parse(spec), Color::NoColor, "spec {spec:?}");
        }
    }

    #[test]
    fn test_palette_layout() {
        assert_eq!(PALETTE[0], (0, 0, 0));
        assert_eq!(PALETTE[9], (255, 0, 0));
        assert_eq!(PALETTE[16], (0, 0, 0));
        assert_eq!(PALETTE[21], (0, 0, 255));
        assert_eq!(PALETTE[196], (255, 0, 0));
        assert_eq!(PALETTE[231], (255, 255, 255));
        assert_eq!(PALETTE[232], (8, 8, 8));
        assert_eq!(PALETTE[255], (238, 238, 238));
    }

    #[test]
    fn test_correspondence_table_exact_matches() {
        // Entries 0-15 correspond to themselves.
        for i in 0..16 {
            assert_eq!(ANSI256_TO_16[i], i as u8);
        }
        // Exact base-color duplicates in the cube map back.
        assert_eq!(ANSI256_TO_16[16], 0); // black
        assert_eq!(ANSI256_TO_16[196], 9); // bright red
        assert_eq!(ANSI256_TO_16[46], 10); // bright green
        assert_eq!(ANSI256_TO_16[21], 12); // bright blue
        assert_eq!(ANSI256_TO_16[231], 15); // bright white
    }

    #[test]
    fn test_rgb_degrades_to_exact_cube_entry() {
        assert_eq!(
            Profile::Ansi256.convert(Color::Rgb(255, 0, 0)),
            Color::Ansi256(196)
        );
        assert_eq!(
            Profile::Ansi256.convert(Color::Rgb(95, 175, 135)),
            Color::Ansi256(72)
        );
    }

    #[test]
    fn test_rgb_degrades_to_grayscale_ramp() {
        assert_eq!(
            Profile::Ansi256.convert(Color::Rgb(128, 128, 128)),
            Color::Ansi256(244)
        );
    }

    #[test]
    fn test_rgb_to_ansi16_goes_through_the_table() {
        let direct = Profile::Ansi16.convert(Color::Rgb(255, 0, 0));
        assert_eq!(direct, Color::Ansi(9));
    }

    #[test]
    fn test_convert_never_upgrades() {
        let c = Color::Ansi256(120);
        assert_eq!(Profile::TrueColor.convert(c), c);
        let c = Color::Ansi(4);
        assert_eq!(Profile::Ansi256.convert(c), c);
        assert_eq!(Profile::TrueColor.convert(c), c);
    }

    #[test]
    fn test_convert_to_ascii_is_no_color() {
        for color in [
            Color::Ansi(4),
            Color::Ansi256(120),
            Color::Rgb(1, 2, 3),
            Color::NoColor,
        ] {
            assert_eq!(Profile::Ascii.convert(color), Color::NoColor);
        }
    }

    #[test]
    fn test_convert_is_idempotent() {
        for profile in [Profile::Ansi16, Profile::Ansi256, Profile::TrueColor] {
            let once = profile.convert(Color::Rgb(200, 100, 50));
            assert_eq!(profile.convert(once), once);
        }
    }

    #[test]
    fn test_degradation_chain_equals_direct() {
        let c = Color::Rgb(200, 100, 50);
        let direct = Profile::Ansi16.convert(c);
        let chained = Profile::Ansi16.convert(Profile::Ansi256.convert(c));
        assert_eq!(direct, chained);
    }

    #[test]
    fn test_out_of_range_ansi_index_is_clamped_not_rejected() {
        let c = Color::Ansi(200);
        // Conversion passes it through unchanged.
        assert_eq!(Profile::Ansi16.convert(c), c);
        // Palette expansion clamps to the nearest valid entry.
        assert_eq!(c.to_rgb(), Some(BASE16[15]));
        // Sequence emission does not panic.
        assert_eq!(c.sequence(false), "282");
    }

    #[test]
    fn test_ansi_sequences() {
        assert_eq!(Color::Ansi(1).sequence(false), "31");
        assert_eq!(Color::Ansi(1).sequence(true), "41");
        assert_eq!(Color::Ansi(9).sequence(false), "91");
        assert_eq!(Color::Ansi(9).sequence(true), "101");
    }

    #[test]
    fn test_extended_sequences() {
        assert_eq!(Color::Ansi256(196).sequence(false), "38;5;196");
        assert_eq!(Color::Ansi256(196).sequence(true), "48;5;196");
        assert_eq!(Color::Rgb(255, 128, 0).sequence(false), "38;2;255;128;0");
        assert_eq!(Color::Rgb(255, 128, 0).sequence(true), "48;2;255;128;0");
        assert_eq!(Color::NoColor.sequence(false), "");
    }

    #[test]
    fn test_display_is_palette_hex() {
        assert_eq!(Color::Rgb(255, 0, 0).to_string(), "#ff0000");
        assert_eq!(Color::Ansi(9).to_string(), "#ff0000");
        assert_eq!(Color::Ansi256(232).to_string(), "#080808");
        assert_eq!(Color::NoColor.to_string(), "");
    }

    #[test]
    fn test_serde_round_trip() {
        for color in [Color::NoColor, Color::Ansi(3), Color::Ansi256(200), Color::Rgb(1, 2, 3)] {
            let json = serde_json::to_string(&color).unwrap();
            let back: Color = serde_json::from_str(&json).unwrap();
            assert_eq!(back, color);
        }
    }
}
