//! Color capability profiles and environment-driven resolution.
//!
//! A [`Profile`] is a terminal's color capability tier. Resolution derives
//! one from explicit overrides, TTY status, and environment signals, in a
//! fixed precedence order where each step short-circuits:
//!
//! 1. Explicit profile override
//! 2. `NO_COLOR` present (any value, even empty)
//! 3. `CLICOLOR_FORCE` set to a non-empty, non-`0` value
//! 4. TTY-ness of the sink
//! 5. `FORCE_COLOR` set to `0`..`3`
//! 6. `COLORTERM` containing `truecolor` or `24bit`
//! 7. `TERM` containing `256color`
//! 8. `CLICOLOR`
//! 9. Default: ANSI-16 on a TTY, Ascii otherwise

use serde::{Deserialize, Serialize};

use crate::environment::Environment;

/// A terminal's color capability tier.
///
/// Totally ordered: `Ascii < Ansi16 < Ansi256 < TrueColor`. The ordering
/// drives both "supports at least X" checks and degradation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Profile {
    /// No color support; rendering passes text through untouched.
    Ascii,
    /// The 16 standard and bright ANSI colors (4-bit).
    Ansi16,
    /// The 256-color palette: 16 base colors, a 6x6x6 cube, and a 24-step
    /// grayscale ramp (8-bit).
    Ansi256,
    /// 16 million colors (24-bit).
    TrueColor,
}

impl Profile {
    /// Conventional display name of the profile.
    pub const fn name(self) -> &'static str {
        match self {
            Profile::Ascii => "Ascii",
            Profile::Ansi16 => "ANSI",
            Profile::Ansi256 => "ANSI256",
            Profile::TrueColor => "TrueColor",
        }
    }

    /// Whether this profile can represent everything `other` can.
    ///
    /// ## Examples
    ///
    /// ```
    /// use termstyle::Profile;
    ///
    /// assert!(Profile::TrueColor.supports(Profile::Ansi16));
    /// assert!(!Profile::Ascii.supports(Profile::Ansi16));
    /// ```
    pub fn supports(self, other: Profile) -> bool {
        self >= other
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the capability profile for a sink.
///
/// Pure function of its inputs: re-resolving with identical inputs yields
/// the identical profile. `tty_override` is the `with_tty` configuration
/// value; `sink_is_tty` is the sink's actual TTY-ness.
pub fn resolve(
    explicit: Option<Profile>,
    tty_override: Option<bool>,
    env: &dyn Environment,
    sink_is_tty: bool,
) -> Profile {
    if let Some(profile) = explicit {
        tracing::debug!(%profile, source = "override", "profile resolved");
        return profile;
    }

    if env.var("NO_COLOR").is_some() {
        tracing::debug!(profile = %Profile::Ascii, source = "NO_COLOR", "profile resolved");
        return Profile::Ascii;
    }

    // A force signal bypasses the TTY check entirely: the floor is ANSI-16
    // and FORCE_COLOR/COLORTERM may only widen it.
    if clicolor_forced(env) {
        let profile = widened(Profile::Ansi16, env);
        tracing::debug!(%profile, source = "CLICOLOR_FORCE", "profile resolved");
        return profile;
    }

    let tty = tty_override.unwrap_or(sink_is_tty);
    if !tty {
        tracing::debug!(profile = %Profile::Ascii, source = "not a tty", "profile resolved");
        return Profile::Ascii;
    }

    if let Some(profile) = force_color(env) {
        tracing::debug!(%profile, source = "FORCE_COLOR", "profile resolved");
        return profile;
    }
    if let Some(profile) = colorterm(env) {
        tracing::debug!(%profile, source = "COLORTERM", "profile resolved");
        return profile;
    }
    if let Some(profile) = term_256color(env) {
        tracing::debug!(%profile, source = "TERM", "profile resolved");
        return profile;
    }

    let profile = match env.var("CLICOLOR").as_deref() {
        Some("0") => Profile::Ascii,
        _ => Profile::Ansi16,
    };
    tracing::debug!(%profile, source = "default", "profile resolved");
    profile
}

/// Environment-only resolution for introspection: the same precedence minus
/// the TTY short-circuit.
///
/// Without a confirmable TTY the final default is [`Profile::Ascii`].
pub fn env_color_profile(env: &dyn Environment) -> Profile {
    if env.var("NO_COLOR").is_some() {
        return Profile::Ascii;
    }
    if clicolor_forced(env) {
        return widened(Profile::Ansi16, env);
    }
    if let Some(profile) = force_color(env) {
        return profile;
    }
    if let Some(profile) = colorterm(env) {
        return profile;
    }
    if let Some(profile) = term_256color(env) {
        return profile;
    }
    match env.var("CLICOLOR").as_deref() {
        Some(value) if value != "0" => Profile::Ansi16,
        _ => Profile::Ascii,
    }
}

/// Whether the environment disables color outright: `NO_COLOR` is present,
/// or `CLICOLOR=0` without a force signal overriding it.
pub fn env_no_color(env: &dyn Environment) -> bool {
    env.var("NO_COLOR").is_some()
        || (env.var("CLICOLOR").as_deref() == Some("0") && !clicolor_forced(env))
}

fn clicolor_forced(env: &dyn Environment) -> bool {
    matches!(env.var("CLICOLOR_FORCE").as_deref(), Some(value) if !value.is_empty() && value != "0")
}

fn force_color(env: &dyn Environment) -> Option<Profile> {
    // Only the literal levels are recognized; anything else is no signal.
    match env.var("FORCE_COLOR").as_deref() {
        Some("0") => Some(Profile::Ascii),
        Some("1") => Some(Profile::Ansi16),
        Some("2") => Some(Profile::Ansi256),
        Some("3") => Some(Profile::TrueColor),
        _ => None,
    }
}

fn colorterm(env: &dyn Environment) -> Option<Profile> {
    let value = env.var("COLORTERM")?.to_lowercase();
    (value.contains("truecolor") || value.contains("24bit")).then_some(Profile::TrueColor)
}

fn term_256color(env: &dyn Environment) -> Option<Profile> {
    let value = env.var("TERM")?.to_lowercase();
    value.contains("256color").then_some(Profile::Ansi256)
}

/// Widen `floor` by the environment's FORCE_COLOR / COLORTERM signals,
/// never narrowing below it.
fn widened(floor: Profile, env: &dyn Environment) -> Profile {
    let mut profile = floor;
    if let Some(forced) = force_color(env) {
        profile = profile.max(forced);
    }
    if let Some(truecolor) = colorterm(env) {
        profile = profile.max(truecolor);
    }
    profile
}
