//! OSC 777 desktop notification encoding.

use crate::{OSC, ST};

/// Encode an `OSC 777;notify` sequence carrying `title` and `body`.
///
/// Emitted regardless of color profile: terminals that do not understand
/// OSC 777 discard it silently, so there is nothing to gate on.
pub fn encode(title: &str, body: &str) -> String {
    format!("{OSC}777;notify;{title};{body}{ST}")
}
