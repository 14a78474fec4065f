//! Profile/session reconciliation controller for babylog.
//!
//! The controller owns all mutable application state: the login session, the
//! profile roster, the active selection, the derived entry list, and the
//! event-composer draft. Remote results are merged in through explicit
//! transition methods; the cache store is a passive persistence target and
//! never a source of truth once remote data has loaded.

use tracing::{debug, warn};

use crate::client::{CreateProfileRequest, RemoteApi, RemoteProfile};
use crate::error::{Error, Result};
use crate::metrics::{self, FamilyMetrics};
use crate::model::{
    current_time_value, map_events_to_entries, preset_text, AuthSession, ChildProfile, EventEntry,
    NoteDraft, PhotoAttachment, PhotoIndex, Theme,
};
use crate::store::CacheStore;

/// Onboarding position within the logged-in flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnboardingStep {
    /// Step 1: create a baby profile.
    #[default]
    CreateProfile,
    /// Step 2: add events for the selected baby.
    AddEvents,
}

/// Whether the view currently reflects remote data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncNote {
    /// Nothing synced yet, or the last sync failed.
    #[default]
    Offline,
    /// The entry list reflects the last successful fetch.
    Synced,
}

impl std::fmt::Display for SyncNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => write!(f, "Offline mode"),
            Self::Synced => write!(f, "Synced from API"),
        }
    }
}

/// All mutable application state, owned exclusively by the controller.
#[derive(Debug, Default)]
pub struct AppState {
    /// Whether the local login gate has been passed.
    pub logged_in: bool,
    /// Email from the last login.
    pub email: String,
    /// Current onboarding step.
    pub onboarding: OnboardingStep,
    /// Whether the family-admin overlay is open.
    pub family_admin_open: bool,
    /// Profile roster, most-recently-created first.
    pub profiles: Vec<ChildProfile>,
    /// Active profile id, if any.
    pub selected_id: Option<String>,
    /// Theme of the active profile.
    pub theme: Theme,
    /// Entry list derived from the last events fetch.
    pub entries: Vec<EventEntry>,
    /// Photo attachments keyed by exact note text. Per-process only.
    pub photos_by_note: PhotoIndex,
    /// Transient event-composer draft.
    pub draft: NoteDraft,
    /// Whether the view reflects remote data.
    pub sync_note: SyncNote,
    /// Last user-facing status message, if any.
    pub status: Option<String>,
    /// Last computed family metrics.
    pub family_metrics: FamilyMetrics,
}

/// The reconciliation controller.
pub struct Controller<A: RemoteApi> {
    api: A,
    store: CacheStore,
    state: AppState,
    /// Monotonic token; a sync result is applied only while its trigger is
    /// still the newest one.
    sync_generation: u64,
}

impl<A: RemoteApi> std::fmt::Debug for Controller<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("sync_generation", &self.sync_generation)
            .finish_non_exhaustive()
    }
}

impl<A: RemoteApi> Controller<A> {
    /// Create a controller with empty state.
    #[must_use]
    pub fn new(api: A, store: CacheStore) -> Self {
        let state = AppState {
            draft: NoteDraft {
                time: Some(current_time_value()),
                ..NoteDraft::default()
            },
            ..AppState::default()
        };
        Self {
            api,
            store,
            state,
            sync_generation: 0,
        }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Mutable access to the event-composer draft.
    pub fn draft_mut(&mut self) -> &mut NoteDraft {
        &mut self.state.draft
    }

    /// Pick the theme applied to the next created profile.
    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
    }

    /// Restore cached state at startup: a remembered session reopens the
    /// logged-in admin view, and a cached roster restores the selection.
    pub fn restore(&mut self) {
        if let Some(session) = self.store.load_session() {
            self.state.logged_in = true;
            self.state.email = session.email;
            self.state.family_admin_open = true;
        }
        let stored = self.store.load_profiles();
        if let Some(first) = stored.first() {
            self.state.selected_id = Some(first.id.clone());
            self.state.theme = first.theme;
            self.state.onboarding = if self.state.logged_in {
                OnboardingStep::CreateProfile
            } else {
                OnboardingStep::AddEvents
            };
            self.state.profiles = stored;
        }
    }

    /// Pass the login gate.
    ///
    /// The session is persisted only when `remember` is set; otherwise any
    /// previously remembered session is cleared so it cannot resurrect later.
    ///
    /// # Errors
    ///
    /// Returns a validation error when either field is blank after trimming,
    /// or a cache error if the session document cannot be written.
    pub async fn login(&mut self, email: &str, password: &str, remember: bool) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(Error::validation("Enter email and password."));
        }
        self.state.logged_in = true;
        self.state.email = email.to_string();
        self.state.onboarding = OnboardingStep::CreateProfile;
        self.state.family_admin_open = true;
        self.state.status = None;
        if remember {
            self.store.save_session(&AuthSession {
                is_logged_in: true,
                email: email.to_string(),
            })?;
        } else {
            self.store.clear_session()?;
        }
        self.maybe_refresh_metrics().await;
        Ok(())
    }

    /// Leave the logged-in state and forget the remembered session.
    ///
    /// # Errors
    ///
    /// Returns a cache error if the session document cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        self.state.logged_in = false;
        self.state.family_admin_open = false;
        self.state.status = None;
        self.store.clear_session()
    }

    /// Create a profile remotely and merge it into the roster.
    ///
    /// Validation runs before any remote call: name first, then birth date.
    /// A remote response without an id sets a non-fatal status message and
    /// leaves local state untouched.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing input, or the remote failure.
    pub async fn create_profile(&mut self, name: &str, birth_date: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Add a baby name to create a profile."));
        }
        if birth_date.trim().is_empty() {
            return Err(Error::validation("Add a birth date to create a profile."));
        }

        let saved = self
            .api
            .create_profile(&CreateProfileRequest {
                name: name.to_string(),
                birth_date: birth_date.trim().to_string(),
            })
            .await?;
        let Some(id) = saved.id().map(ToString::to_string) else {
            self.state.status = Some("Profile created. Copy the ID from the response.".to_string());
            return Ok(());
        };

        let profile = ChildProfile {
            id: id.clone(),
            name: name.to_string(),
            theme: self.state.theme,
        };
        self.state.profiles.retain(|p| p.id != id);
        self.state.profiles.insert(0, profile);
        self.state.selected_id = Some(id);
        self.state.onboarding = OnboardingStep::AddEvents;
        self.state.family_admin_open = false;
        self.state.status = Some("Profile created.".to_string());
        self.persist_roster()?;

        if let Err(err) = self.sync_selected().await {
            warn!("initial sync after profile creation failed: {err}");
        }
        Ok(())
    }

    /// Select the active profile and apply its stored theme.
    ///
    /// An empty id clears the selection and resets the theme. While logged
    /// in, a selection change triggers a re-sync of profile and events.
    ///
    /// # Errors
    ///
    /// Returns the sync failure, after recording the offline state.
    pub async fn select_profile(&mut self, id: &str) -> Result<()> {
        if id.is_empty() {
            self.state.selected_id = None;
            self.state.theme = Theme::default();
            return Ok(());
        }
        self.state.theme = self
            .state
            .profiles
            .iter()
            .find(|p| p.id == id)
            .map_or(Theme::default(), |p| p.theme);
        self.state.selected_id = Some(id.to_string());
        if self.state.logged_in {
            self.sync_selected().await
        } else {
            Ok(())
        }
    }

    /// Select an existing child from the admin view and jump to the
    /// add-events step.
    ///
    /// # Errors
    ///
    /// Returns the sync failure, after recording the offline state.
    pub async fn choose_existing_child(&mut self, id: &str) -> Result<()> {
        self.state.onboarding = OnboardingStep::AddEvents;
        self.state.family_admin_open = false;
        self.state.status = None;
        self.select_profile(id).await
    }

    /// Begin a sync attempt, superseding any in-flight one.
    ///
    /// Returns the generation token that [`Self::apply_sync`] must present.
    pub fn begin_sync(&mut self) -> u64 {
        self.sync_generation += 1;
        self.sync_generation
    }

    /// Apply the outcome of a profile+events fetch.
    ///
    /// A result whose generation has been superseded is silently discarded,
    /// so a slow response can never overwrite a newer trigger's state. On
    /// success the entry list is replaced and the roster's cached name is
    /// refreshed when the remote name differs; on failure the entry list is
    /// cleared and the view drops to offline.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure after recording the offline state.
    pub fn apply_sync(
        &mut self,
        generation: u64,
        profile_id: &str,
        outcome: Result<(RemoteProfile, Vec<String>)>,
    ) -> Result<()> {
        if generation != self.sync_generation {
            debug!("discarding superseded sync result for {profile_id}");
            return Ok(());
        }
        match outcome {
            Ok((profile, events)) => {
                if let Some(remote_name) = profile.name {
                    let renamed = self
                        .state
                        .profiles
                        .iter_mut()
                        .find(|p| p.id == profile_id && p.name != remote_name);
                    if let Some(cached) = renamed {
                        cached.name = remote_name;
                        self.persist_roster()?;
                    }
                }
                self.state.entries =
                    map_events_to_entries(&events, profile_id, &self.state.photos_by_note);
                self.state.sync_note = SyncNote::Synced;
                self.state.status = None;
                Ok(())
            }
            Err(err) => {
                self.state.entries.clear();
                self.state.sync_note = SyncNote::Offline;
                self.state.status = Some("Could not sync. Check baby ID.".to_string());
                Err(err)
            }
        }
    }

    /// Re-sync the selected profile: profile and events fetched in parallel
    /// with an eager join, so either failure collapses the reconciliation.
    ///
    /// No-op when nothing is selected or the user is logged out. Never
    /// retries.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure after recording the offline state.
    pub async fn sync_selected(&mut self) -> Result<()> {
        let Some(id) = self.state.selected_id.clone() else {
            return Ok(());
        };
        if !self.state.logged_in {
            return Ok(());
        }
        let generation = self.begin_sync();
        let outcome = tokio::try_join!(self.api.fetch_profile(&id), self.api.fetch_events(&id));
        self.apply_sync(generation, &id, outcome)
    }

    /// Toggle a composer preset by label.
    ///
    /// Selecting the active preset again clears it along with the draft text
    /// it filled in.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown preset label.
    pub fn select_preset(&mut self, label: &str) -> Result<()> {
        if self.state.draft.preset.as_deref() == Some(label) {
            self.state.draft.preset = None;
            self.state.draft.text.clear();
            return Ok(());
        }
        let Some(text) = preset_text(label) else {
            return Err(Error::validation(format!("Unknown preset: {label}")));
        };
        self.state.draft.preset = Some(label.to_string());
        self.state.draft.text = text.to_string();
        Ok(())
    }

    /// Attach a photo to the draft.
    pub fn attach_photo(&mut self, photo: PhotoAttachment) {
        self.state.draft.photo = Some(photo);
    }

    /// Submit the composed draft as a new event.
    ///
    /// On success the photo-by-note cache learns the new note, the timeline
    /// is re-fetched and re-derived, and the draft resets with the time field
    /// re-initialized to the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no profile is selected or the draft
    /// composes to nothing, or the remote failure.
    pub async fn add_event(&mut self) -> Result<()> {
        let Some(id) = self.state.selected_id.clone() else {
            return Err(Error::validation("Enter a baby ID to add events."));
        };
        let Some(note) = self.state.draft.compose() else {
            return Err(Error::validation(
                "Pick an autofill option or write a short event note first.",
            ));
        };

        self.api.add_events(&id, &[note.clone()]).await?;

        if let Some(photo) = self.state.draft.photo.take() {
            if !photo.name.is_empty() {
                self.state.photos_by_note.insert(note.clone(), photo);
            }
        }
        self.state.draft = NoteDraft {
            time: Some(current_time_value()),
            ..NoteDraft::default()
        };

        let events = self.api.fetch_events(&id).await?;
        self.state.entries = map_events_to_entries(&events, &id, &self.state.photos_by_note);
        self.state.sync_note = SyncNote::Synced;
        self.state.status = Some("Event added.".to_string());
        Ok(())
    }

    /// Re-fetch the timeline for the selected profile only.
    ///
    /// # Errors
    ///
    /// Returns a validation error when nothing is selected, or the remote
    /// failure after dropping the view to offline.
    pub async fn refresh_timeline(&mut self) -> Result<()> {
        let Some(id) = self.state.selected_id.clone() else {
            return Err(Error::validation("Select a profile first."));
        };
        match self.api.fetch_events(&id).await {
            Ok(events) => {
                self.state.entries =
                    map_events_to_entries(&events, &id, &self.state.photos_by_note);
                self.state.sync_note = SyncNote::Synced;
                self.state.status = Some("Timeline refreshed.".to_string());
                Ok(())
            }
            Err(err) => {
                self.state.sync_note = SyncNote::Offline;
                self.state.status = Some("Could not refresh timeline.".to_string());
                Err(err)
            }
        }
    }

    /// Open the family-admin overlay and refresh its metrics.
    pub async fn open_family_admin(&mut self) {
        self.state.onboarding = OnboardingStep::CreateProfile;
        self.state.family_admin_open = true;
        self.state.status = None;
        self.maybe_refresh_metrics().await;
    }

    /// Jump back to the create-profile step, with the admin overlay closed.
    pub fn start_add_child(&mut self) {
        self.state.onboarding = OnboardingStep::CreateProfile;
        self.state.family_admin_open = false;
        self.state.status = None;
    }

    /// Recompute family metrics for the whole roster.
    pub async fn refresh_family_metrics(&mut self) {
        self.state.family_metrics = metrics::collect(&self.api, &self.state.profiles).await;
    }

    /// Probe the remote health endpoint.
    ///
    /// # Errors
    ///
    /// Returns the remote failure.
    pub async fn health_check(&self) -> Result<serde_json::Value> {
        self.api.health_check().await
    }

    /// Refresh metrics only while the admin view is open and the user is
    /// logged in, mirroring the roster-change trigger.
    async fn maybe_refresh_metrics(&mut self) {
        if self.state.logged_in && self.state.family_admin_open {
            self.refresh_family_metrics().await;
        }
    }

    /// Persist the roster, skipping an emptied one.
    ///
    /// The skip is deliberate: a transient empty in-memory roster must not
    /// wipe the stored document. View and storage can desync here; that is
    /// the documented behavior, not an accident to repair silently.
    fn persist_roster(&self) -> Result<()> {
        if self.state.profiles.is_empty() {
            return Ok(());
        }
        self.store.save_profiles(&self.state.profiles)
    }
}
