//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::Mood;

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Email to log in with
    pub email: String,

    /// Password (local convenience gate, not a security boundary)
    #[arg(short, long)]
    pub password: String,

    /// Keep the session on this device
    #[arg(short, long)]
    pub remember: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Profile management commands.
#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Create a baby profile
    Create {
        /// Baby name
        name: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(short, long)]
        birth_date: String,

        /// Profile theme
        #[arg(short, long, value_enum, default_value = "blue")]
        theme: ThemeArg,
    },

    /// List cached profiles
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Select the active profile and sync its timeline
    Select {
        /// Profile id (empty string clears the selection)
        id: String,
    },
}

/// Event commands.
#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// Compose and submit a new event
    Add {
        /// Quick-autofill preset label (e.g. "Feeding", "Nap")
        #[arg(short = 'P', long)]
        preset: Option<String>,

        /// Free-text note body
        #[arg(short, long)]
        note: Option<String>,

        /// Event time as HH:MM (defaults to now)
        #[arg(short, long)]
        time: Option<String>,

        /// Recorded mood
        #[arg(short, long, value_enum, default_value = "content")]
        mood: MoodArg,

        /// Attach a photo by path
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Fetch and print the timeline for the selected profile
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Analytics command arguments.
#[derive(Debug, Args)]
pub struct AnalyticsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Family metrics command arguments.
#[derive(Debug, Args)]
pub struct FamilyCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Stopwatch command arguments.
#[derive(Debug, Args)]
pub struct StopwatchCommand {
    /// Note to merge the captured duration into when the session ends
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Mood argument for the event composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MoodArg {
    /// Soft and satisfied
    #[default]
    Content,
    /// Quiet and calm
    Calm,
    /// Sleepy eyes
    Sleepy,
    /// Playful mood
    Playful,
}

impl From<MoodArg> for Mood {
    fn from(arg: MoodArg) -> Self {
        match arg {
            MoodArg::Content => Self::Content,
            MoodArg::Calm => Self::Calm,
            MoodArg::Sleepy => Self::Sleepy,
            MoodArg::Playful => Self::Playful,
        }
    }
}

/// Theme argument for profile creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeArg {
    /// Blue theme
    #[default]
    Blue,
    /// Pink theme
    Pink,
    /// Green theme
    Green,
    /// Off-white theme
    Offwhite,
}

impl From<ThemeArg> for crate::model::Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Blue => Self::Blue,
            ThemeArg::Pink => Self::Pink,
            ThemeArg::Green => Self::Green,
            ThemeArg::Offwhite => Self::OffWhite,
        }
    }
}
