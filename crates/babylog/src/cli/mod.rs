//! Command-line interface for babylog.
//!
//! This module provides the CLI structure and command handlers for the
//! `babylog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnalyticsCommand, ConfigCommand, EventCommand, FamilyCommand, LoginCommand, MoodArg,
    ProfileCommand, StatusCommand, StopwatchCommand, ThemeArg,
};

/// babylog - Log and review your baby's day
///
/// Tracks feedings, diapers, naps, and everything in between against one or
/// more child profiles, synced with the hosted event store and cached
/// locally.
#[derive(Debug, Parser)]
#[command(name = "babylog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in (local convenience gate)
    Login(LoginCommand),

    /// Log out and forget the remembered session
    Logout,

    /// Show session, roster, and cache status
    Status(StatusCommand),

    /// Manage baby profiles
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Add or list events
    #[command(subcommand)]
    Event(EventCommand),

    /// Show the analytics snapshot for the selected baby
    Analytics(AnalyticsCommand),

    /// Show family-wide metrics across all profiles
    Family(FamilyCommand),

    /// Run the session stopwatch
    Stopwatch(StopwatchCommand),

    /// Probe the remote API health endpoint
    Health,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
