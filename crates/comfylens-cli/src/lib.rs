//! Argument parsing and rendering for the `comfylens` binary
//!
//! Kept in a library so both can be unit tested without spawning the CLI.

pub mod args;
pub mod render;

pub use args::{CliCommand, CliOptions, InputSource, OutputMode, parse_arguments};
pub use render::{Report, render_json, render_text};
