//! Output context: a sink, a resolved profile, and detection caches.
//!
//! An [`Output`] binds an [`Environment`] to the capability decisions the
//! rest of the crate needs: which [`Profile`] to render at, whether the
//! sink is interactive, and what the terminal's default colors are. All
//! detection is lazy and cached write-once, so concurrent callers agree on
//! one answer and the terminal is queried at most once per context.

use std::sync::{Arc, LazyLock, Mutex, OnceLock};
use std::time::Duration;

use tracing::debug;

use crate::color::Color;
use crate::environment::{Environment, ProcessEnvironment, Stream};
use crate::profile::{self, Profile};
use crate::query::{OSC_BACKGROUND_QUERY, OSC_FOREGROUND_QUERY, parse_color_response};
use crate::style::Style;
use crate::{hyperlink as hyperlink_osc, notification};

/// How long a terminal gets to answer an OSC color query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(100);

/// The process-wide default context: stdout, real environment, color
/// detection cached.
static DEFAULT_OUTPUT: LazyLock<Output> =
    LazyLock::new(|| Output::builder().with_color_cache(true).build());

/// A sink-bound rendering context.
///
/// Construction is cheap; the profile and terminal colors are computed on
/// first use. Detected colors are cached only when the context was built
/// with [`OutputBuilder::with_color_cache`], matching long-lived process
/// use; short-lived contexts re-query so a changed terminal theme is
/// picked up.
///
/// ## Examples
///
/// ```
/// use termstyle::{MapEnvironment, Output, Profile};
///
/// let env = MapEnvironment::new().set("TERM", "xterm-256color").tty(true);
/// let out = Output::builder().with_environment(env).build();
/// assert_eq!(out.profile(), Profile::Ansi256);
/// ```
#[derive(Clone)]
pub struct Output {
    environment: Arc<dyn Environment>,
    profile_override: Option<Profile>,
    tty_override: Option<bool>,
    unsafe_mode: bool,
    color_cache: bool,
    query_timeout: Duration,
    query_lock: Arc<Mutex<()>>,
    profile_cell: OnceLock<Profile>,
    foreground_cell: OnceLock<Color>,
    background_cell: OnceLock<Color>,
}

impl Output {
    /// Start building a context bound to stdout and the real environment.
    pub fn builder() -> OutputBuilder {
        OutputBuilder::default()
    }

    /// A context with all defaults: stdout, real environment, no cache.
    pub fn new() -> Output {
        Output::builder().build()
    }

    /// The resolved color profile of this context.
    ///
    /// Resolved once on first call; every later call returns the same
    /// answer even if the environment changed in between.
    pub fn profile(&self) -> Profile {
        *self.profile_cell.get_or_init(|| {
            profile::resolve(
                self.profile_override,
                self.tty_override,
                self.environment.as_ref(),
                self.environment.is_tty(),
            )
        })
    }

    /// Whether this context treats its sink as interactive.
    ///
    /// An explicit TTY override wins, unsafe mode assumes a terminal, a
    /// non-empty `CI` variable denies one, and otherwise the sink is asked.
    pub fn is_tty(&self) -> bool {
        if let Some(tty) = self.tty_override {
            return tty;
        }
        if self.unsafe_mode {
            return true;
        }
        if matches!(self.environment.var("CI"), Some(value) if !value.is_empty()) {
            return false;
        }
        self.environment.is_tty()
    }

    /// A styled span bound to this context's profile.
    pub fn string(&self, text: impl Into<String>) -> Style {
        Style::new(self.profile(), text)
    }

    /// Parse a color specification and degrade it to this profile.
    pub fn color(&self, spec: &str) -> Color {
        self.profile().convert(Color::parse(spec))
    }

    /// Whether the environment asks for color to be disabled.
    pub fn env_no_color(&self) -> bool {
        profile::env_no_color(self.environment.as_ref())
    }

    /// The profile the environment variables alone would grant.
    pub fn env_color_profile(&self) -> Profile {
        profile::env_color_profile(self.environment.as_ref())
    }

    /// The terminal's default foreground color.
    ///
    /// OSC 10 query first, `COLORFGBG` fallback second,
    /// [`Color::NoColor`] when neither yields anything.
    pub fn foreground_color(&self) -> Color {
        if self.color_cache {
            *self
                .foreground_cell
                .get_or_init(|| self.detect_color(OSC_FOREGROUND_QUERY, false))
        } else {
            self.detect_color(OSC_FOREGROUND_QUERY, false)
        }
    }

    /// The terminal's default background color.
    ///
    /// OSC 11 query first, `COLORFGBG` fallback second,
    /// [`Color::NoColor`] when neither yields anything.
    pub fn background_color(&self) -> Color {
        if self.color_cache {
            *self
                .background_cell
                .get_or_init(|| self.detect_color(OSC_BACKGROUND_QUERY, true))
        } else {
            self.detect_color(OSC_BACKGROUND_QUERY, true)
        }
    }

    /// Whether the terminal background reads as dark.
    ///
    /// Relative luminance below one half counts as dark. Unknown
    /// backgrounds count as dark too, the safer bet for most terminals.
    pub fn has_dark_background(&self) -> bool {
        match self.background_color().to_rgb() {
            Some((r, g, b)) => luminance(r, g, b) < 0.5,
            None => true,
        }
    }

    /// Wrap `label` in an OSC 8 hyperlink at this context's profile.
    pub fn hyperlink(&self, url: &str, label: &str) -> String {
        hyperlink_osc::encode(self.profile(), url, label)
    }

    /// Encode an OSC 777 notification.
    pub fn notify(&self, title: &str, body: &str) -> String {
        notification::encode(title, body)
    }

    fn detect_color(&self, request: &str, background: bool) -> Color {
        if self.is_tty() {
            // One query channel per context: round trips must never
            // interleave, even on the uncached path.
            let _serialized = self
                .query_lock
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match self.environment.query_terminal(request, self.query_timeout) {
                Ok(response) => {
                    if let Some((r, g, b)) = parse_color_response(&response) {
                        return Color::Rgb(r, g, b);
                    }
                    debug!(background, "unparseable terminal color response");
                }
                Err(error) => {
                    debug!(background, %error, "terminal color query failed");
                }
            }
        }
        if let Some(value) = self.environment.var("COLORFGBG") {
            if let Some(color) = parse_colorfgbg(&value, background) {
                return color;
            }
        }
        Color::NoColor
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::new()
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("profile_override", &self.profile_override)
            .field("tty_override", &self.tty_override)
            .field("unsafe_mode", &self.unsafe_mode)
            .field("color_cache", &self.color_cache)
            .field("query_timeout", &self.query_timeout)
            .field("profile", &self.profile_cell.get())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Output`].
#[derive(Default)]
pub struct OutputBuilder {
    environment: Option<Arc<dyn Environment>>,
    stream: Stream,
    profile: Option<Profile>,
    tty: Option<bool>,
    unsafe_mode: bool,
    color_cache: bool,
    query_timeout: Option<Duration>,
}

impl OutputBuilder {
    /// Pin the profile instead of resolving it from the environment.
    ///
    /// An explicit profile beats everything, `NO_COLOR` included.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Pin the sink's TTY-ness instead of asking the sink.
    #[must_use]
    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = Some(tty);
        self
    }

    /// Substitute the backing environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Arc::new(environment));
        self
    }

    /// Cache detected foreground/background colors for the context's
    /// lifetime.
    #[must_use]
    pub fn with_color_cache(mut self, cache: bool) -> Self {
        self.color_cache = cache;
        self
    }

    /// Assume the sink is a terminal even when it cannot be verified.
    #[must_use]
    pub fn with_unsafe(mut self) -> Self {
        self.unsafe_mode = true;
        self
    }

    /// Bound each OSC color query with a custom timeout.
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Bind the context to stderr instead of stdout.
    #[must_use]
    pub fn stderr(mut self) -> Self {
        self.stream = Stream::Stderr;
        self
    }

    pub fn build(self) -> Output {
        let environment = self
            .environment
            .unwrap_or_else(|| Arc::new(ProcessEnvironment::new(self.stream)));
        Output {
            environment,
            profile_override: self.profile,
            tty_override: self.tty,
            unsafe_mode: self.unsafe_mode,
            color_cache: self.color_cache,
            query_timeout: self.query_timeout.unwrap_or(DEFAULT_QUERY_TIMEOUT),
            query_lock: Arc::new(Mutex::new(())),
            profile_cell: OnceLock::new(),
            foreground_cell: OnceLock::new(),
            background_cell: OnceLock::new(),
        }
    }
}

/// Pick a color out of a `COLORFGBG` value like `15;0` or `15;default;0`.
///
/// The first field is the foreground and the last the background; both are
/// palette indices.
fn parse_colorfgbg(value: &str, background: bool) -> Option<Color> {
    let parts: Vec<&str> = value.split(';').collect();
    if parts.len() < 2 {
        return None;
    }
    let field = if background { parts[parts.len() - 1] } else { parts[0] };
    let index: u8 = field.trim().parse().ok()?;
    Some(if index < 16 {
        Color::Ansi(index)
    } else {
        Color::Ansi256(index)
    })
}

/// Relative luminance of an sRGB color, 0.0 (black) to 1.0 (white).
fn luminance(r: u8, g: u8, b: u8) -> f64 {
    (0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b)) / 255.0
}

/// The shared stdout context.
pub fn default_output() -> &'static Output {
    &DEFAULT_OUTPUT
}

/// [`Output::profile`] on the default context.
pub fn color_profile() -> Profile {
    default_output().profile()
}

/// [`Output::env_color_profile`] on the default context.
pub fn env_color_profile() -> Profile {
    default_output().env_color_profile()
}

/// [`Output::env_no_color`] on the default context.
pub fn env_no_color() -> bool {
    default_output().env_no_color()
}

/// [`Output::string`] on the default context.
pub fn string(text: impl Into<String>) -> Style {
    default_output().string(text)
}

/// [`Output::foreground_color`] on the default context.
pub fn foreground_color() -> Color {
    default_output().foreground_color()
}

/// [`Output::background_color`] on the default context.
pub fn background_color() -> Color {
    default_output().background_color()
}

/// [`Output::has_dark_background`] on the default context.
pub fn has_dark_background() -> bool {
    default_output().has_dark_background()
}

/// [`Output::hyperlink`] on the default context.
pub fn hyperlink(url: &str, label: &str) -> String {
    default_output().hyperlink(url, label)
}

/// [`Output::notify`] on the default context.
pub fn notify(title: &str, body: &str) -> String {
    default_output().notify(title, body)
}
