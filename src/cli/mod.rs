//! Command-line interface for vsbridge.

mod commands;

pub use commands::{is_verbose, run};
