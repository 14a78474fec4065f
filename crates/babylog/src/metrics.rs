//! Family-wide metrics for babylog.
//!
//! Fetches events for every known profile concurrently and aggregates
//! fleet-wide statistics. The fan-out is a tolerant join: a profile whose
//! fetch fails is skipped with a warning and excluded from aggregation,
//! never retried.

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::analytics::{classify, Category};
use crate::client::RemoteApi;
use crate::model::ChildProfile;

/// Event count for one child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildActivity {
    /// Profile id.
    pub id: String,
    /// Profile name.
    pub name: String,
    /// Number of events fetched for the profile.
    pub count: usize,
}

/// Fleet-wide statistics, recomputed wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FamilyMetrics {
    /// Total events across all profiles that loaded.
    pub total_events: usize,
    /// Per-child counts in profile-list order (loaded profiles only).
    pub per_child: Vec<ChildActivity>,
    /// Most frequent category, or `None` when nothing loaded.
    pub top_event_type: Option<Category>,
    /// Count behind `top_event_type`.
    pub top_event_count: usize,
    /// Names of children with exactly zero events.
    pub inactive_children: Vec<String>,
}

impl FamilyMetrics {
    /// Display label for the top category ("None" when absent).
    #[must_use]
    pub fn top_event_label(&self) -> String {
        self.top_event_type
            .map_or_else(|| "None".to_string(), |category| category.to_string())
    }
}

/// Collect family metrics across the whole roster.
///
/// One events fetch per profile, all in flight together. Ties for the top
/// category break toward the category encountered first while scanning
/// events in profile-list order.
pub async fn collect(api: &dyn RemoteApi, profiles: &[ChildProfile]) -> FamilyMetrics {
    if profiles.is_empty() {
        return FamilyMetrics::default();
    }

    let fetches = profiles
        .iter()
        .map(|profile| async move { (profile, api.fetch_events(&profile.id).await) });
    let outcomes = join_all(fetches).await;

    let mut per_child = Vec::new();
    let mut total_events = 0usize;
    // First-encounter order decides ties for the top category
    let mut type_counts: Vec<(Category, usize)> = Vec::new();

    for (profile, outcome) in outcomes {
        match outcome {
            Ok(events) => {
                per_child.push(ChildActivity {
                    id: profile.id.clone(),
                    name: profile.name.clone(),
                    count: events.len(),
                });
                total_events += events.len();
                for note in &events {
                    let category = classify(note);
                    match type_counts.iter_mut().find(|(c, _)| *c == category) {
                        Some((_, count)) => *count += 1,
                        None => type_counts.push((category, 1)),
                    }
                }
            }
            Err(err) => {
                warn!("skipping metrics for {}: {err}", profile.name);
            }
        }
    }

    let mut top_event_type = None;
    let mut top_event_count = 0usize;
    for (category, count) in &type_counts {
        if *count > top_event_count {
            top_event_type = Some(*category);
            top_event_count = *count;
        }
    }

    let inactive_children = per_child
        .iter()
        .filter(|child| child.count == 0)
        .map(|child| child.name.clone())
        .collect();

    FamilyMetrics {
        total_events,
        per_child,
        top_event_type,
        top_event_count,
        inactive_children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{CreateProfileRequest, RemoteProfile};
    use crate::error::{Error, Result};
    use crate::model::Theme;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;

    /// Scripted events-per-profile double; ids absent from the map fail.
    #[derive(Debug, Default)]
    struct ScriptedApi {
        events: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl RemoteApi for ScriptedApi {
        async fn create_profile(&self, _request: &CreateProfileRequest) -> Result<RemoteProfile> {
            Err(Error::request_failed("not scripted"))
        }

        async fn fetch_profile(&self, _profile_id: &str) -> Result<RemoteProfile> {
            Err(Error::request_failed("not scripted"))
        }

        async fn fetch_events(&self, profile_id: &str) -> Result<Vec<String>> {
            self.events
                .get(profile_id)
                .cloned()
                .ok_or_else(|| Error::request_failed("request failed with status 500"))
        }

        async fn add_events(&self, _profile_id: &str, _events: &[String]) -> Result<Value> {
            Err(Error::request_failed("not scripted"))
        }

        async fn health_check(&self) -> Result<Value> {
            Err(Error::request_failed("not scripted"))
        }
    }

    fn profile(id: &str, name: &str) -> ChildProfile {
        ChildProfile {
            id: id.to_string(),
            name: name.to_string(),
            theme: Theme::Blue,
        }
    }

    fn notes(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_empty_roster_yields_default() {
        let api = ScriptedApi::default();
        let metrics = collect(&api, &[]).await;
        assert_eq!(metrics, FamilyMetrics::default());
        assert_eq!(metrics.top_event_label(), "None");
    }

    #[tokio::test]
    async fn test_aggregates_across_roster() {
        let mut api = ScriptedApi::default();
        api.events
            .insert("kid-1".to_string(), notes(&["Feeding", "Feeding", "Nap started"]));
        api.events
            .insert("kid-2".to_string(), notes(&["Poop diaper"]));

        let profiles = vec![profile("kid-1", "Ava"), profile("kid-2", "Mateo")];
        let metrics = collect(&api, &profiles).await;

        assert_eq!(metrics.total_events, 4);
        assert_eq!(metrics.per_child.len(), 2);
        assert_eq!(metrics.per_child[0].name, "Ava");
        assert_eq!(metrics.per_child[0].count, 3);
        assert_eq!(metrics.top_event_type, Some(Category::Feeding));
        assert_eq!(metrics.top_event_count, 2);
        assert!(metrics.inactive_children.is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_skipped() {
        let mut api = ScriptedApi::default();
        api.events.insert("kid-1".to_string(), notes(&["Feeding"]));
        api.events.insert("kid-3".to_string(), notes(&["Crying episode"]));
        // kid-2 is not scripted, so its fetch fails

        let profiles = vec![
            profile("kid-1", "Ava"),
            profile("kid-2", "Mateo"),
            profile("kid-3", "Noor"),
        ];
        let metrics = collect(&api, &profiles).await;

        assert_eq!(metrics.total_events, 2);
        assert_eq!(metrics.per_child.len(), 2);
        let names: Vec<&str> = metrics.per_child.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ava", "Noor"]);
    }

    #[tokio::test]
    async fn test_top_category_tie_breaks_to_first_encountered() {
        let mut api = ScriptedApi::default();
        // Sleep appears first, then Feeding catches up to the same count
        api.events.insert(
            "kid-1".to_string(),
            notes(&["Nap started", "Feeding", "sleep at last", "Feeding time"]),
        );

        let metrics = collect(&api, &[profile("kid-1", "Ava")]).await;

        assert_eq!(metrics.top_event_type, Some(Category::Sleep));
        assert_eq!(metrics.top_event_count, 2);
    }

    #[tokio::test]
    async fn test_inactive_children_have_zero_events() {
        let mut api = ScriptedApi::default();
        api.events.insert("kid-1".to_string(), notes(&["Feeding"]));
        api.events.insert("kid-2".to_string(), Vec::new());

        let profiles = vec![profile("kid-1", "Ava"), profile("kid-2", "Mateo")];
        let metrics = collect(&api, &profiles).await;

        assert_eq!(metrics.inactive_children, vec!["Mateo".to_string()]);
    }

    #[tokio::test]
    async fn test_per_child_preserves_roster_order() {
        let mut api = ScriptedApi::default();
        for id in ["kid-1", "kid-2", "kid-3"] {
            api.events.insert(id.to_string(), Vec::new());
        }
        let profiles = vec![
            profile("kid-2", "Mateo"),
            profile("kid-3", "Noor"),
            profile("kid-1", "Ava"),
        ];
        let metrics = collect(&api, &profiles).await;

        let ids: Vec<&str> = metrics.per_child.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["kid-2", "kid-3", "kid-1"]);
    }
}
