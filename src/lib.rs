//! # termstyle
//!
//! Terminal capability detection and styled text rendering.
//!
//! This crate decides how much color a target terminal supports, degrades
//! requested colors down to that capability, and emits the matching escape
//! sequences for text attributes, colors, and hyperlinks:
//!
//! - **Profile detection**: derive a capability tier (Ascii, ANSI-16,
//!   ANSI-256, TrueColor) from overrides, TTY status, and environment
//!   signals (`NO_COLOR`, `FORCE_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE`,
//!   `COLORTERM`, `TERM`)
//! - **Color degradation**: convert any color to the nearest representable
//!   color at a lower capability tier, never upgrading fidelity
//! - **Styled spans**: persistent, branchable style values rendering to SGR
//!   sequences
//! - **Background detection**: OSC 10/11 terminal queries with bounded
//!   timeouts and a fail-safe dark default
//! - **OSC encoders**: hyperlinks (OSC 8) and notifications (OSC 777)
//!
//! ## Quick Start
//!
//! ```
//! use termstyle::{Color, MapEnvironment, Output, Profile};
//!
//! let env = MapEnvironment::new().set("COLORTERM", "truecolor").tty(true);
//! let out = Output::builder().with_environment(env).build();
//! assert_eq!(out.profile(), Profile::TrueColor);
//!
//! let styled = out.string("hello").bold().foreground(Color::parse("#FF0000"));
//! assert_eq!(styled.render(), "\x1b[1;38;2;255;0;0mhello\x1b[0m");
//! ```
//!
//! ## Modules
//!
//! - [`profile`] - Capability tiers and environment-driven resolution
//! - [`color`] - Color model, palette tables, and degradation
//! - [`style`] - Styled text spans with persistent builder semantics
//! - [`output`] - Output context binding a sink, profile, and caches
//! - [`environment`] - Injectable environment/TTY capability
//! - [`hyperlink`] - OSC 8 hyperlink encoding
//! - [`notification`] - OSC 777 notification encoding

pub mod color;
pub mod environment;
pub mod hyperlink;
pub mod notification;
pub mod output;
pub mod profile;
mod query;
pub mod style;

pub use color::Color;
pub use environment::{Environment, MapEnvironment, ProcessEnvironment, QueryError, Stream};
pub use output::{
    DEFAULT_QUERY_TIMEOUT, Output, OutputBuilder, background_color, color_profile,
    default_output, env_color_profile, env_no_color, foreground_color, has_dark_background,
    hyperlink, notify, string,
};
pub use profile::Profile;
pub use style::{Attributes, Style};

/// ASCII escape.
pub const ESC: &str = "\x1b";
/// Bell; accepted as an OSC terminator by most terminals.
pub const BEL: &str = "\x07";
/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";
/// Operating System Command introducer.
pub const OSC: &str = "\x1b]";
/// String Terminator.
pub const ST: &str = "\x1b\\";
