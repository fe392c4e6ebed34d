//! Command-line front end.
//!
//! - `args` - flag parsing and config overrides
//! - `render` - terminal output for session notifications

pub mod args;
pub mod render;

pub use args::{parse_args, ArgsError, CliCommand, CliOptions, USAGE};
pub use render::TerminalRenderer;

/// Crate version, as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
