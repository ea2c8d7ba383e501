//! OSC 8 hyperlink encoding.

use crate::{OSC, ST};
use crate::profile::Profile;

/// Wrap `label` in an OSC 8 hyperlink pointing at `url`.
///
/// Hyperlinks ride on color support: an [`Profile::Ascii`] profile gets the
/// bare label, as does an empty URL. The label itself is never altered.
///
/// ## Examples
///
/// ```
/// use termstyle::{Profile, hyperlink};
///
/// assert_eq!(
///     hyperlink::encode(Profile::Ansi16, "https://example.com", "docs"),
///     "\x1b]8;;https://example.com\x1b\\docs\x1b]8;;\x1b\\"
/// );
/// assert_eq!(
///     hyperlink::encode(Profile::Ascii, "https://example.com", "docs"),
///     "docs"
/// );
/// ```
pub fn encode(profile: Profile, url: &str, label: &str) -> String {
    if profile == Profile::Ascii || url.is_empty() {
        return label.to_string();
    }
    format!("{OSC}8;;{url}{ST}{label}{OSC}8;;{ST}")
}
