//! Injectable environment and TTY capabilities.
//!
//! Profile resolution and background detection never read the process
//! environment directly; they go through the [`Environment`] trait so tests
//! can substitute a synthetic variable map ([`MapEnvironment`]) for the real
//! process state ([`ProcessEnvironment`]).

use std::collections::HashMap;
use std::io::IsTerminal;
use std::time::Duration;

use thiserror::Error;

/// Failure modes of the interactive terminal-query channel.
///
/// None of these propagate into the rendering path: [`crate::Output`] maps
/// every variant to a documented safe default (no color, dark background).
#[derive(Debug, Error)]
pub enum QueryError {
    /// The environment has no query channel (synthetic environments, or
    /// platforms without a controlling terminal device).
    #[error("terminal queries are not supported by this environment")]
    Unsupported,
    /// No controlling terminal is available.
    #[error("no controlling terminal available")]
    NotATty,
    /// The terminal device could not be opened, written, or read.
    #[error("terminal device unavailable: {0}")]
    Io(#[from] std::io::Error),
    /// No complete response arrived within the deadline.
    #[error("terminal did not respond within {0:?}")]
    Timeout(Duration),
    /// The terminal answered with something unparseable.
    #[error("unrecognized terminal response")]
    MalformedResponse,
}

/// The standard stream an output context is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stream {
    #[default]
    Stdout,
    Stderr,
}

/// Read-only access to environment variables plus the TTY-ness and query
/// channel of a particular sink.
///
/// Stateless besides its backing store; implementations must be freely
/// shareable across threads.
pub trait Environment: Send + Sync {
    /// Look up a variable.
    ///
    /// Presence matters: `Some("")` (set but empty) is distinct from `None`
    /// (unset). `NO_COLOR=` must disable color.
    fn var(&self, key: &str) -> Option<String>;

    /// Enumerate all variables as key/value pairs.
    fn vars(&self) -> Vec<(String, String)>;

    /// Whether the bound sink is a terminal.
    fn is_tty(&self) -> bool;

    /// Perform an interactive query round trip against the terminal.
    ///
    /// Writes `request` to the terminal and reads the response, bounded by
    /// `timeout`. The default implementation reports the channel as absent,
    /// which makes synthetic environments trivially non-interactive.
    fn query_terminal(&self, request: &str, timeout: Duration) -> Result<String, QueryError> {
        let _ = (request, timeout);
        Err(QueryError::Unsupported)
    }
}

/// The real process environment, bound to stdout or stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment {
    stream: Stream,
}

impl ProcessEnvironment {
    pub const fn new(stream: Stream) -> Self {
        Self { stream }
    }
}

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars().collect()
    }

    fn is_tty(&self) -> bool {
        match self.stream {
            Stream::Stdout => std::io::stdout().is_terminal(),
            Stream::Stderr => std::io::stderr().is_terminal(),
        }
    }

    // The query channel is the controlling terminal, not the bound sink:
    // a redirected stdout still has a usable /dev/tty.
    fn query_terminal(&self, request: &str, timeout: Duration) -> Result<String, QueryError> {
        crate::query::roundtrip(request, timeout)
    }
}

/// Synthetic environment for tests: a fixed variable map plus a TTY flag.
///
/// ## Examples
///
/// ```
/// use termstyle::environment::{Environment, MapEnvironment};
///
/// let env = MapEnvironment::new().set("TERM", "xterm-256color").tty(true);
/// assert_eq!(env.var("TERM").as_deref(), Some("xterm-256color"));
/// assert!(env.is_tty());
/// assert!(env.var("NO_COLOR").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
    tty: bool,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, returning the updated environment.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Declare the sink's TTY-ness.
    #[must_use]
    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            tty: false,
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort();
        all
    }

    fn is_tty(&self) -> bool {
        self.tty
    }
}
