//! Opsdesk CLI library
//!
//! Subcommands live here so they can be tested without spawning the binary.

pub mod commands;

/// Output switches shared by every subcommand
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}
