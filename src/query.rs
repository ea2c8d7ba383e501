//! Interactive OSC query round trips against the controlling terminal.
//!
//! Talks to `/dev/tty` directly so redirected stdout/stderr does not break
//! detection. The terminal is put into non-canonical, no-echo mode for the
//! duration of the exchange and restored on every exit path. Reads happen
//! on a background thread so a silent terminal costs at most the caller's
//! timeout, never a hang.

use std::sync::LazyLock;

use regex::Regex;

/// OSC 10: report the default foreground color.
pub(crate) const OSC_FOREGROUND_QUERY: &str = "\x1b]10;?\x1b\\";
/// OSC 11: report the default background color.
pub(crate) const OSC_BACKGROUND_QUERY: &str = "\x1b]11;?\x1b\\";

/// Responses are bounded; anything longer is garbage.
const MAX_RESPONSE_LEN: usize = 256;

/// XParseColor-style payload: `rgb:RRRR/GGGG/BBBB` with 1-4 hex digits
/// per channel.
static RGB_RESPONSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgb:([0-9a-fA-F]{1,4})/([0-9a-fA-F]{1,4})/([0-9a-fA-F]{1,4})")
        .expect("rgb response pattern is valid")
});

/// Extract the color from an OSC 10/11 response.
///
/// Channels are normalized to 8 bits with rounding, so `rgb:ffff/0/0` and
/// `rgb:ff/0/0` both come out as `(255, 0, 0)`.
pub(crate) fn parse_color_response(response: &str) -> Option<(u8, u8, u8)> {
    let captures = RGB_RESPONSE.captures(response)?;
    let r = channel(captures.get(1)?.as_str())?;
    let g = channel(captures.get(2)?.as_str())?;
    let b = channel(captures.get(3)?.as_str())?;
    Some((r, g, b))
}

/// Scale a 1-4 hex digit channel to 0-255, rounding half up.
fn channel(hex: &str) -> Option<u8> {
    let value = u32::from_str_radix(hex, 16).ok()?;
    let max = (1u32 << (4 * hex.len() as u32)) - 1;
    Some(((value * 255 + max / 2) / max) as u8)
}

/// A complete response ends in BEL or ST; partial reads keep accumulating.
fn is_response_complete(buf: &[u8]) -> bool {
    buf.ends_with(b"\x07") || buf.ends_with(b"\x1b\\")
}

#[cfg(unix)]
pub(crate) use unix::roundtrip;

#[cfg(unix)]
mod unix {
    use std::fs::OpenOptions;
    use std::io::{Read, Write};
    use std::os::fd::{AsRawFd, RawFd};
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    use tracing::trace;

    use super::{MAX_RESPONSE_LEN, is_response_complete};
    use crate::environment::QueryError;

    /// Restores the terminal's original termios state on drop.
    struct RawModeGuard {
        fd: RawFd,
        original: libc::termios,
    }

    impl RawModeGuard {
        fn new(fd: RawFd) -> std::io::Result<Self> {
            // SAFETY: fd is a valid open descriptor and termios is
            // zero-initializable.
            unsafe {
                let mut original: libc::termios = std::mem::zeroed();
                if libc::tcgetattr(fd, &mut original) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                let mut raw = original;
                raw.c_lflag &= !(libc::ICANON | libc::ECHO);
                raw.c_cc[libc::VMIN] = 0;
                raw.c_cc[libc::VTIME] = 1;
                if libc::tcsetattr(fd, libc::TCSANOW, &raw) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(Self { fd, original })
            }
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            // SAFETY: restoring the state captured in new() on the same fd.
            unsafe {
                libc::tcsetattr(self.fd, libc::TCSANOW, &self.original);
            }
        }
    }

    /// Write `request` to `/dev/tty` and collect the response, bounded
    /// by `timeout`.
    pub(crate) fn roundtrip(request: &str, timeout: Duration) -> Result<String, QueryError> {
        // No controlling terminal at all (daemons, some CI sandboxes)
        // reads as the channel being absent, not as an I/O fault.
        let mut tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open("/dev/tty")
            .map_err(|_| QueryError::NotATty)?;
        let _guard = RawModeGuard::new(tty.as_raw_fd())?;

        tty.write_all(request.as_bytes())?;
        tty.flush()?;

        let mut reader = tty.try_clone()?;
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        // Detached on purpose: if the terminal never answers, the thread
        // drains at most one VTIME tick after the channel closes.
        std::thread::spawn(move || {
            let mut chunk = [0u8; 64];
            loop {
                match reader.read(&mut chunk) {
                    // VTIME tick with no data; the empty send doubles as a
                    // dropped-receiver check so the thread exits.
                    Ok(0) => {
                        if tx.send(Vec::new()).is_err() {
                            return;
                        }
                    }
                    Ok(n) => {
                        if tx.send(chunk[..n].to_vec()).is_err() {
                            return;
                        }
                    }
                    Err(_) => return,
                }
            }
        });

        let deadline = Instant::now() + timeout;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let now = Instant::now();
            if now >= deadline {
                trace!(?timeout, "terminal query timed out");
                return Err(QueryError::Timeout(timeout));
            }
            match rx.recv_timeout(deadline - now) {
                Ok(chunk) => {
                    buf.extend_from_slice(&chunk);
                    if is_response_complete(&buf) {
                        return Ok(String::from_utf8_lossy(&buf).into_owned());
                    }
                    if buf.len() > MAX_RESPONSE_LEN {
                        return Err(QueryError::MalformedResponse);
                    }
                }
                Err(_) => {
                    trace!(?timeout, "terminal query timed out");
                    return Err(QueryError::Timeout(timeout));
                }
            }
        }
    }
}

#[cfg(not(unix))]
pub(crate) fn roundtrip(
    _request: &str,
    _timeout: std::time::Duration,
) -> Result<String, crate::environment::QueryError> {
    tracing::trace!("no terminal query channel on this platform");
    Err(crate::environment::QueryError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_digit_channels() {
        let response = "\x1b]11;rgb:ffff/0000/0000\x07";
        assert_eq!(parse_color_response(response), Some((255, 0, 0)));
    }

    #[test]
    fn test_parse_two_digit_channels() {
        let response = "\x1b]11;rgb:1e/1e/2e\x1b\\";
        assert_eq!(parse_color_response(response), Some((0x1e, 0x1e, 0x2e)));
    }

    #[test]
    fn test_channel_width_normalization_agrees() {
        // The same color at different precisions scales to the same byte.
        assert_eq!(channel("f"), Some(255));
        assert_eq!(channel("ff"), Some(255));
        assert_eq!(channel("ffff"), Some(255));
        assert_eq!(channel("8"), Some(136));
        assert_eq!(channel("80"), Some(128));
        assert_eq!(channel("8080"), Some(128));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_color_response(""), None);
        assert_eq!(parse_color_response("\x1b]11;?\x07"), None);
        assert_eq!(parse_color_response("rgb:fffff/0/0 extra digits"), None);
    }

    #[test]
    fn test_response_termination() {
        assert!(is_response_complete(b"\x1b]11;rgb:0/0/0\x07"));
        assert!(is_response_complete(b"\x1b]11;rgb:0/0/0\x1b\\"));
        assert!(!is_response_complete(b"\x1b]11;rgb:0/0/0"));
        assert!(!is_response_complete(b""));
    }
}
