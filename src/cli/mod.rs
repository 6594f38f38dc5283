//! CLI module for capplan.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested.
//! The entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{execute, load_config, run_cli};
pub use output::{
    format_bounded, format_odds, format_percent, help_text, version_text, ScenarioRow, UslRow,
};

#[cfg(test)]
mod tests;
