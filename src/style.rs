//! Styled text spans with persistent builder semantics.
//!
//! A [`Style`] is a value: every mutator takes `&self` and returns a new
//! style, so a partially-built style can be branched without the branches
//! contaminating each other. Rendering degrades colors through the style's
//! [`Profile`] and emits a single SGR prefix plus a trailing reset.

use serde::{Deserialize, Serialize};

use crate::CSI;
use crate::color::Color;
use crate::profile::Profile;

/// The boolean text attributes a span can carry.
///
/// Attribute state is a set, not a sequence: applying the same attribute
/// twice is the same as applying it once, and application order never
/// changes the rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub overline: bool,
    pub crossout: bool,
}

/// A text span with accumulated attributes and colors, bound to a profile.
///
/// ## Examples
///
/// ```
/// use termstyle::{Color, Profile, Style};
///
/// let s = Style::new(Profile::TrueColor, "hi").bold().underline();
/// assert_eq!(s.render(), "\x1b[1;4mhi\x1b[0m");
///
/// // Branches are independent.
/// let base = Style::new(Profile::Ansi16, "x");
/// let a = base.bold();
/// let b = base.italic();
/// assert_eq!(a.render(), "\x1b[1mx\x1b[0m");
/// assert_eq!(b.render(), "\x1b[3mx\x1b[0m");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    profile: Profile,
    text: String,
    attributes: Attributes,
    foreground: Color,
    background: Color,
}

impl Style {
    /// A plain span at the given profile.
    pub fn new(profile: Profile, text: impl Into<String>) -> Self {
        Self {
            profile,
            text: text.into(),
            attributes: Attributes::default(),
            foreground: Color::NoColor,
            background: Color::NoColor,
        }
    }

    /// The profile this span renders against.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// The unstyled text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The accumulated attribute set.
    pub fn attributes(&self) -> Attributes {
        self.attributes
    }

    #[must_use]
    pub fn bold(&self) -> Style {
        let mut next = self.clone();
        next.attributes.bold = true;
        next
    }

    #[must_use]
    pub fn faint(&self) -> Style {
        let mut next = self.clone();
        next.attributes.faint = true;
        next
    }

    #[must_use]
    pub fn italic(&self) -> Style {
        let mut next = self.clone();
        next.attributes.italic = true;
        next
    }

    #[must_use]
    pub fn underline(&self) -> Style {
        let mut next = self.clone();
        next.attributes.underline = true;
        next
    }

    #[must_use]
    pub fn blink(&self) -> Style {
        let mut next = self.clone();
        next.attributes.blink = true;
        next
    }

    #[must_use]
    pub fn reverse(&self) -> Style {
        let mut next = self.clone();
        next.attributes.reverse = true;
        next
    }

    #[must_use]
    pub fn overline(&self) -> Style {
        let mut next = self.clone();
        next.attributes.overline = true;
        next
    }

    #[must_use]
    pub fn crossout(&self) -> Style {
        let mut next = self.clone();
        next.attributes.crossout = true;
        next
    }

    /// Set the foreground color. A later call replaces an earlier one.
    #[must_use]
    pub fn foreground(&self, color: Color) -> Style {
        let mut next = self.clone();
        next.foreground = color;
        next
    }

    /// Set the background color. A later call replaces an earlier one.
    #[must_use]
    pub fn background(&self, color: Color) -> Style {
        let mut next = self.clone();
        next.background = color;
        next
    }

    /// Render the span as `CSI codes m text CSI 0 m`.
    ///
    /// Attribute codes come out in a fixed order regardless of how the
    /// style was built, then the foreground, then the background, each
    /// degraded through the profile. With no effective codes (an Ascii
    /// profile, or nothing set) the bare text comes back with no escape
    /// bytes at all.
    pub fn render(&self) -> String {
        let codes = self.codes();
        if codes.is_empty() {
            return self.text.clone();
        }
        format!("{CSI}{}m{}{CSI}0m", codes.join(";"), self.text)
    }

    fn codes(&self) -> Vec<String> {
        if self.profile == Profile::Ascii {
            return Vec::new();
        }
        let a = self.attributes;
        let mut codes = Vec::new();
        for (on, code) in [
            (a.bold, "1"),
            (a.faint, "2"),
            (a.italic, "3"),
            (a.underline, "4"),
            (a.blink, "5"),
            (a.reverse, "7"),
            (a.overline, "53"),
            (a.crossout, "9"),
        ] {
            if on {
                codes.push(code.to_string());
            }
        }
        let fg = self.profile.convert(self.foreground).sequence(false);
        if !fg.is_empty() {
            codes.push(fg);
        }
        let bg = self.profile.convert(self.background).sequence(true);
        if !bg.is_empty() {
            codes.push(bg);
        }
        codes
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_span_renders_bare_text() {
        let s = Style::new(Profile::TrueColor, "plain");
        assert_eq!(s.render(), "plain");
    }

    #[test]
    fn test_ascii_profile_strips_everything() {
        let s = Style::new(Profile::Ascii, "plain")
            .bold()
            .underline()
            .foreground(Color::Rgb(255, 0, 0))
            .background(Color::Ansi256(22));
        assert_eq!(s.render(), "plain");
    }

    #[test]
    fn test_attribute_code_order_is_fixed() {
        let forward = Style::new(Profile::Ansi16, "t").bold().crossout().overline();
        let backward = Style::new(Profile::Ansi16, "t").overline().crossout().bold();
        assert_eq!(forward.render(), "\x1b[1;53;9mt\x1b[0m");
        assert_eq!(forward.render(), backward.render());
    }

    #[test]
    fn test_attribute_application_is_idempotent() {
        let once = Style::new(Profile::Ansi16, "t").bold();
        let twice = once.bold();
        assert_eq!(once.render(), twice.render());
    }

    #[test]
    fn test_all_attribute_codes() {
        let s = Style::new(Profile::Ansi16, "t")
            .bold()
            .faint()
            .italic()
            .underline()
            .blink()
            .reverse()
            .overline()
            .crossout();
        assert_eq!(s.render(), "\x1b[1;2;3;4;5;7;53;9mt\x1b[0m");
    }

    #[test]
    fn test_foreground_then_background_order() {
        let s = Style::new(Profile::TrueColor, "t")
            .background(Color::Ansi(4))
            .foreground(Color::Ansi(1));
        assert_eq!(s.render(), "\x1b[31;44mt\x1b[0m");
    }

    #[test]
    fn test_bright_ansi_foreground_at_truecolor() {
        // Bright red stays an ANSI index even on a truecolor terminal.
        let s = Style::new(Profile::TrueColor, "ERROR").foreground(Color::Ansi(9));
        assert_eq!(s.render(), "\x1b[91mERROR\x1b[0m");
    }

    #[test]
    fn test_colors_degrade_through_the_profile() {
        let s = Style::new(Profile::Ansi256, "t").foreground(Color::Rgb(255, 0, 0));
        assert_eq!(s.render(), "\x1b[38;5;196mt\x1b[0m");

        let s = Style::new(Profile::Ansi16, "t").foreground(Color::Rgb(255, 0, 0));
        assert_eq!(s.render(), "\x1b[91mt\x1b[0m");
    }

    #[test]
    fn test_later_color_replaces_earlier() {
        let s = Style::new(Profile::Ansi16, "t")
            .foreground(Color::Ansi(1))
            .foreground(Color::Ansi(2));
        assert_eq!(s.render(), "\x1b[32mt\x1b[0m");
    }

    #[test]
    fn test_no_color_produces_no_codes() {
        let s = Style::new(Profile::TrueColor, "t")
            .foreground(Color::NoColor)
            .background(Color::NoColor);
        assert_eq!(s.render(), "t");
    }

    #[test]
    fn test_branches_are_independent() {
        let base = Style::new(Profile::Ansi16, "x").bold();
        let red = base.foreground(Color::Ansi(1));
        let blue = base.foreground(Color::Ansi(4));
        assert_eq!(base.render(), "\x1b[1mx\x1b[0m");
        assert_eq!(red.render(), "\x1b[1;31mx\x1b[0m");
        assert_eq!(blue.render(), "\x1b[1;34mx\x1b[0m");
    }

    #[test]
    fn test_display_matches_render() {
        let s = Style::new(Profile::Ansi16, "t").bold();
        assert_eq!(s.to_string(), s.render());
    }

    #[test]
    fn test_empty_text_still_wraps() {
        let s = Style::new(Profile::Ansi16, "").bold();
        assert_eq!(s.render(), "\x1b[1m\x1b[0m");
    }
}
