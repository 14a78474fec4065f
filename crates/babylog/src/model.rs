//! Core domain types for babylog.
//!
//! This module defines the child profile, session, and event-entry types,
//! plus the projection from raw remote note strings into display entries and
//! the composition of a new note from its draft parts.

use std::collections::HashMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Color theme attached to a child profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Default theme.
    #[default]
    Blue,
    /// Pink theme.
    Pink,
    /// Green theme.
    Green,
    /// Off-white theme.
    OffWhite,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blue => write!(f, "blue"),
            Self::Pink => write!(f, "pink"),
            Self::Green => write!(f, "green"),
            Self::OffWhite => write!(f, "offwhite"),
        }
    }
}

/// A tracked child, identified by a server-assigned id.
///
/// The roster is ordered most-recently-created first and is persisted to the
/// local cache on every change. Profiles are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProfile {
    /// Remote-assigned unique identifier.
    pub id: String,
    /// Display name; refreshed when a later profile fetch returns an update.
    pub name: String,
    /// Theme chosen at creation time.
    #[serde(default)]
    pub theme: Theme,
}

/// A remembered login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Whether the session represents a logged-in user.
    pub is_logged_in: bool,
    /// Email the user logged in with.
    pub email: String,
}

/// Mood recorded alongside an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Soft and satisfied.
    #[default]
    Content,
    /// Quiet and calm.
    Calm,
    /// Sleepy eyes.
    Sleepy,
    /// Playful mood.
    Playful,
}

impl Mood {
    /// The wire/display keyword for this mood.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Calm => "calm",
            Self::Sleepy => "sleepy",
            Self::Playful => "playful",
        }
    }

    /// Longer display description shown next to timeline entries.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Content => "Soft and satisfied",
            Self::Calm => "Quiet and calm",
            Self::Sleepy => "Sleepy eyes",
            Self::Playful => "Playful mood",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "calm" => Ok(Self::Calm),
            "sleepy" => Ok(Self::Sleepy),
            "playful" => Ok(Self::Playful),
            other => Err(format!("unknown mood: {other}")),
        }
    }
}

/// A photo attached to an event, held in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    /// Data URL (or path) of the photo.
    pub url: String,
    /// Original file name.
    pub name: String,
}

/// In-memory association from exact note text to its photo attachment.
///
/// Never persisted; invalidated on restart. Any edit to the note text before
/// attachment loses the mapping.
pub type PhotoIndex = HashMap<String, PhotoAttachment>;

/// A display entry derived from a raw remote note string.
///
/// Pure projection: recomputed on every fetch, no independent identity. The
/// id is index-derived and therefore not stable across list mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    /// Synthesized identifier, `"{profile_id}-{index}"`.
    pub id: String,
    /// Entry kind; remote events are always plain events.
    #[serde(rename = "type")]
    pub kind: String,
    /// Placeholder; remote events carry no time field.
    pub time: String,
    /// Raw remote note text.
    pub notes: String,
    /// Default mood; not persisted remotely.
    pub mood: Mood,
    /// Default icon key.
    pub icon: String,
    /// Photo URL recovered from the photo index, or empty.
    pub photo: String,
    /// Photo file name recovered from the photo index, or empty.
    pub photo_name: String,
}

/// Project raw remote note strings into display entries.
#[must_use]
pub fn map_events_to_entries(
    events: &[String],
    profile_id: &str,
    photos: &PhotoIndex,
) -> Vec<EventEntry> {
    events
        .iter()
        .enumerate()
        .map(|(index, note)| {
            let attachment = photos.get(note);
            EventEntry {
                id: format!("{profile_id}-{index}"),
                kind: "Event".to_string(),
                time: "--".to_string(),
                notes: note.clone(),
                mood: Mood::Content,
                icon: "sparkles".to_string(),
                photo: attachment.map(|p| p.url.clone()).unwrap_or_default(),
                photo_name: attachment.map(|p| p.name.clone()).unwrap_or_default(),
            }
        })
        .collect()
}

/// A quick-autofill event preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPreset {
    /// Button label, also used as the bracketed note prefix.
    pub label: &'static str,
    /// Draft text the preset fills in.
    pub text: &'static str,
}

/// The quick-autofill presets offered by the composer.
pub const EVENT_PRESETS: [EventPreset; 8] = [
    EventPreset {
        label: "Crying",
        text: "Crying episode",
    },
    EventPreset {
        label: "Poop",
        text: "Poop diaper",
    },
    EventPreset {
        label: "Pee",
        text: "Wet diaper",
    },
    EventPreset {
        label: "Feeding",
        text: "Feeding",
    },
    EventPreset {
        label: "Nap",
        text: "Nap started",
    },
    EventPreset {
        label: "Medicine",
        text: "Medicine given",
    },
    EventPreset {
        label: "Tummy Time",
        text: "Tummy time",
    },
    EventPreset {
        label: "Bath",
        text: "Bath time",
    },
];

/// Look up a preset's draft text by its label (case-insensitive).
#[must_use]
pub fn preset_text(label: &str) -> Option<&'static str> {
    EVENT_PRESETS
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(label))
        .map(|p| p.text)
}

/// Transient state of the event composer form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    /// Selected preset label, if any.
    pub preset: Option<String>,
    /// Free-text note body.
    pub text: String,
    /// Event time as `HH:MM`, if set.
    pub time: Option<String>,
    /// Recorded mood.
    pub mood: Mood,
    /// Attached photo, if any.
    pub photo: Option<PhotoAttachment>,
}

impl NoteDraft {
    /// Compose the final note text from the draft parts.
    ///
    /// Parts are joined with `" • "` in fixed order: bracketed preset label,
    /// free text, `@ HH:MM`, `Mood: <mood>`, `Photo: <filename>`. Empty
    /// components are omitted. Returns `None` when neither a preset nor free
    /// text is present.
    #[must_use]
    pub fn compose(&self) -> Option<String> {
        let preset = self
            .preset
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let text = self.text.trim();
        if preset.is_none() && text.is_empty() {
            return None;
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(label) = preset {
            parts.push(format!("[{label}]"));
        }
        if !text.is_empty() {
            parts.push(text.to_string());
        }
        if let Some(time) = self.time.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!("@ {time}"));
        }
        parts.push(format!("Mood: {}", self.mood));
        if let Some(photo) = &self.photo {
            if !photo.name.is_empty() {
                parts.push(format!("Photo: {}", photo.name));
            }
        }
        Some(parts.join(" • "))
    }
}

/// Current wall-clock time formatted as `HH:MM`, for the composer time field.
#[must_use]
pub fn current_time_value() -> String {
    Local::now().format("%H:%M").to_string()
}

/// Encouragement quotes rotated by day of month.
const MOTIVATIONAL_QUOTES: [&str; 4] = [
    "You are doing better than you think, one little moment at a time.",
    "Tiny steps count. Every log is care in action.",
    "Progress is not loud. It is diapers, feeds, and quiet consistency.",
    "Your presence is the routine your baby remembers most.",
];

/// The quote for today, selected by day of month.
#[must_use]
pub fn daily_quote() -> &'static str {
    use chrono::Datelike;
    let idx = Local::now().day() as usize % MOTIVATIONAL_QUOTES.len();
    MOTIVATIONAL_QUOTES[idx]
}
