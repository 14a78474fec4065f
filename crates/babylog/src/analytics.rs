//! Event classification and analytics for babylog.
//!
//! Categories are derived from free-text notes by keyword matching in a
//! fixed priority order; the analytics snapshot buckets entries for the
//! donut and bar charts.

use serde::Serialize;

use crate::model::EventEntry;

/// Category derived from an event note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// Feeding events.
    Feeding,
    /// Diaper changes.
    Diaper,
    /// Naps and sleep.
    Sleep,
    /// Crying episodes.
    Crying,
    /// Medicine, bath, tummy time.
    Care,
    /// Everything else.
    Other,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Feeding => write!(f, "Feeding"),
            Self::Diaper => write!(f, "Diaper"),
            Self::Sleep => write!(f, "Sleep"),
            Self::Crying => write!(f, "Crying"),
            Self::Care => write!(f, "Care"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Classify a note into a category.
///
/// Substrings are tested in fixed priority order; the first match wins.
/// Order matters because notes often contain several keywords.
#[must_use]
pub fn classify(note: &str) -> Category {
    let text = note.to_lowercase();
    if text.contains("feed") {
        return Category::Feeding;
    }
    if ["diaper", "poop", "pee", "wet"].iter().any(|k| text.contains(k)) {
        return Category::Diaper;
    }
    if text.contains("nap") || text.contains("sleep") {
        return Category::Sleep;
    }
    if text.contains("cry") {
        return Category::Crying;
    }
    if ["medicine", "bath", "tummy"].iter().any(|k| text.contains(k)) {
        return Category::Care;
    }
    Category::Other
}

/// Display bucket for the charts; Crying and Care merge into Comfort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayBucket {
    /// Feeding events.
    Feeding,
    /// Diaper changes.
    Diaper,
    /// Naps and sleep.
    Sleep,
    /// Crying and care merged.
    Comfort,
    /// Everything else.
    Other,
}

impl DisplayBucket {
    /// Fixed bucket order used by both charts.
    pub const ALL: [Self; 5] = [
        Self::Feeding,
        Self::Diaper,
        Self::Sleep,
        Self::Comfort,
        Self::Other,
    ];

    /// Chart label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Feeding => "Feeding",
            Self::Diaper => "Diaper",
            Self::Sleep => "Sleep",
            Self::Comfort => "Comfort",
            Self::Other => "Other",
        }
    }
}

impl From<Category> for DisplayBucket {
    fn from(category: Category) -> Self {
        match category {
            Category::Feeding => Self::Feeding,
            Category::Diaper => Self::Diaper,
            Category::Sleep => Self::Sleep,
            Category::Crying | Category::Care => Self::Comfort,
            Category::Other => Self::Other,
        }
    }
}

/// A bucket and its entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// The display bucket.
    pub bucket: DisplayBucket,
    /// Number of entries in the bucket.
    pub count: usize,
}

/// An angular slice of the donut chart.
///
/// `bucket` is `None` only for the full-circle empty-state placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DonutSpan {
    /// The bucket this slice represents, or `None` for the placeholder.
    pub bucket: Option<DisplayBucket>,
    /// Start angle in degrees.
    pub start_deg: f64,
    /// End angle in degrees.
    pub end_deg: f64,
}

/// Chart-ready aggregation of the current entry list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSnapshot {
    /// Total entry count.
    pub total: usize,
    /// Largest bucket count, floored at 1 for bar scaling.
    pub max_value: usize,
    /// All five buckets in fixed order, zero counts included.
    pub segments: Vec<Segment>,
    /// Donut slices for non-empty buckets, or the placeholder slice.
    pub spans: Vec<DonutSpan>,
}

/// Build the analytics snapshot from the in-memory entry list.
///
/// Angular spans come from cumulative running totals, so for a non-empty set
/// they partition the full 360 degrees in bucket order.
#[must_use]
pub fn build_analytics(entries: &[EventEntry]) -> AnalyticsSnapshot {
    let mut counts = [0usize; DisplayBucket::ALL.len()];
    for entry in entries {
        let bucket = DisplayBucket::from(classify(&entry.notes));
        let slot = DisplayBucket::ALL.iter().position(|b| *b == bucket);
        if let Some(slot) = slot {
            counts[slot] += 1;
        }
    }

    let segments: Vec<Segment> = DisplayBucket::ALL
        .iter()
        .zip(counts.iter())
        .map(|(bucket, count)| Segment {
            bucket: *bucket,
            count: *count,
        })
        .collect();

    let total: usize = counts.iter().sum();
    let max_value = counts.iter().copied().max().unwrap_or(0).max(1);

    let spans = if total == 0 {
        vec![DonutSpan {
            bucket: None,
            start_deg: 0.0,
            end_deg: 360.0,
        }]
    } else {
        let mut progress = 0usize;
        segments
            .iter()
            .filter(|segment| segment.count > 0)
            .map(|segment| {
                #[allow(clippy::cast_precision_loss)]
                let start_deg = progress as f64 / total as f64 * 360.0;
                progress += segment.count;
                #[allow(clippy::cast_precision_loss)]
                let end_deg = progress as f64 / total as f64 * 360.0;
                DonutSpan {
                    bucket: Some(segment.bucket),
                    start_deg,
                    end_deg,
                }
            })
            .collect()
    };

    AnalyticsSnapshot {
        total,
        max_value,
        segments,
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{map_events_to_entries, PhotoIndex};

    fn entries_from(notes: &[&str]) -> Vec<EventEntry> {
        let events: Vec<String> = notes.iter().map(ToString::to_string).collect();
        map_events_to_entries(&events, "kid-1", &PhotoIndex::new())
    }

    #[test]
    fn test_classify_each_keyword() {
        assert_eq!(classify("Feeding"), Category::Feeding);
        assert_eq!(classify("Poop diaper"), Category::Diaper);
        assert_eq!(classify("wet again"), Category::Diaper);
        assert_eq!(classify("Nap started"), Category::Sleep);
        assert_eq!(classify("finally asleep"), Category::Sleep);
        assert_eq!(classify("Crying episode"), Category::Crying);
        assert_eq!(classify("Medicine given"), Category::Care);
        assert_eq!(classify("Tummy time"), Category::Care);
        assert_eq!(classify("Bath time"), Category::Care);
        assert_eq!(classify("Grandma visited"), Category::Other);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("FEEDING at noon"), Category::Feeding);
        assert_eq!(classify("NaP"), Category::Sleep);
    }

    #[test]
    fn test_classify_priority_feed_wins() {
        // "feed" beats every co-occurring keyword
        assert_eq!(classify("cried during feeding"), Category::Feeding);
        assert_eq!(classify("feed then nap then bath"), Category::Feeding);
    }

    #[test]
    fn test_classify_priority_diaper_beats_sleep() {
        assert_eq!(classify("wet diaper before nap"), Category::Diaper);
    }

    #[test]
    fn test_classify_priority_crying_beats_care() {
        assert_eq!(classify("crying during bath"), Category::Crying);
    }

    #[test]
    fn test_bucket_merges_crying_and_care() {
        assert_eq!(DisplayBucket::from(Category::Crying), DisplayBucket::Comfort);
        assert_eq!(DisplayBucket::from(Category::Care), DisplayBucket::Comfort);
    }

    #[test]
    fn test_segments_sum_to_total() {
        let entries = entries_from(&[
            "Feeding",
            "Poop diaper",
            "Nap started",
            "Crying episode",
            "Bath time",
            "Grandma visited",
        ]);
        let snapshot = build_analytics(&entries);

        assert_eq!(snapshot.total, 6);
        let segment_sum: usize = snapshot.segments.iter().map(|s| s.count).sum();
        assert_eq!(segment_sum, snapshot.total);
        // Crying + Bath both land in Comfort
        let comfort = snapshot
            .segments
            .iter()
            .find(|s| s.bucket == DisplayBucket::Comfort)
            .unwrap();
        assert_eq!(comfort.count, 2);
    }

    #[test]
    fn test_segments_fixed_order() {
        let snapshot = build_analytics(&entries_from(&["Feeding"]));
        let order: Vec<DisplayBucket> = snapshot.segments.iter().map(|s| s.bucket).collect();
        assert_eq!(order, DisplayBucket::ALL.to_vec());
    }

    #[test]
    fn test_spans_cover_full_circle() {
        let entries = entries_from(&["Feeding", "Feeding", "Nap started", "Grandma visited"]);
        let snapshot = build_analytics(&entries);

        let first = snapshot.spans.first().unwrap();
        let last = snapshot.spans.last().unwrap();
        assert!((first.start_deg - 0.0).abs() < f64::EPSILON);
        assert!((last.end_deg - 360.0).abs() < 1e-9);

        // Contiguous: each span starts where the previous ended
        for pair in snapshot.spans.windows(2) {
            assert!((pair[0].end_deg - pair[1].start_deg).abs() < 1e-9);
        }
        // Zero-count buckets get no span
        assert_eq!(snapshot.spans.len(), 3);
    }

    #[test]
    fn test_span_width_is_proportional() {
        let entries = entries_from(&["Feeding", "Feeding", "Nap started", "Nap started"]);
        let snapshot = build_analytics(&entries);

        let feeding = snapshot.spans[0];
        assert_eq!(feeding.bucket, Some(DisplayBucket::Feeding));
        assert!((feeding.end_deg - feeding.start_deg - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_set_placeholder() {
        let snapshot = build_analytics(&[]);

        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.max_value, 1);
        assert_eq!(
            snapshot.spans,
            vec![DonutSpan {
                bucket: None,
                start_deg: 0.0,
                end_deg: 360.0,
            }]
        );
    }

    #[test]
    fn test_max_value_tracks_largest_bucket() {
        let entries = entries_from(&["Feeding", "Feeding", "Feeding", "Nap started"]);
        let snapshot = build_analytics(&entries);
        assert_eq!(snapshot.max_value, 3);
    }
}
