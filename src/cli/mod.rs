//! CLI module for the replay scanner.
//!
//! Provides command-line interface parsing and command dispatch.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, PlayersArgs, ScanArgs, WatchArgs};
