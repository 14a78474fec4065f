//! Local cache store for babylog.
//!
//! Two independent JSON documents under the data directory: the cached
//! profile roster and the remembered login session. Loads are fail-soft (a
//! missing or malformed document reads as absent); writes are unconditional
//! and create parent directories as needed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{AuthSession, ChildProfile};

/// File-backed key-value cache for the roster and session documents.
///
/// A passive persistence target: never a source of truth once remote data
/// has loaded.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Path of the roster document.
    profiles_path: PathBuf,
    /// Path of the session document.
    session_path: PathBuf,
}

impl CacheStore {
    /// Create a store using the paths resolved from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            profiles_path: config.profiles_path(),
            session_path: config.session_path(),
        }
    }

    /// Create a store rooted at an explicit directory.
    #[must_use]
    pub fn at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            profiles_path: dir.join("profiles.json"),
            session_path: dir.join("session.json"),
        }
    }

    /// Path of the roster document.
    #[must_use]
    pub fn profiles_path(&self) -> &Path {
        &self.profiles_path
    }

    /// Load the cached profile roster.
    ///
    /// A missing file, unreadable file, parse failure, or non-array shape all
    /// yield an empty roster. Malformed cache is logged and treated as absent,
    /// never surfaced as an error.
    #[must_use]
    pub fn load_profiles(&self) -> Vec<ChildProfile> {
        let raw = match fs::read_to_string(&self.profiles_path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!("no cached roster at {}: {err}", self.profiles_path.display());
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ChildProfile>>(&raw) {
            Ok(profiles) => profiles,
            Err(err) => {
                warn!(
                    "discarding malformed roster cache at {}: {err}",
                    self.profiles_path.display()
                );
                Vec::new()
            }
        }
    }

    /// Persist the profile roster.
    ///
    /// Unconditional: callers decide when (not) to persist. The controller
    /// skips this call for an emptied roster so a transient empty view never
    /// wipes the stored one.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save_profiles(&self, profiles: &[ChildProfile]) -> Result<()> {
        self.write_document(&self.profiles_path, &serde_json::to_string(profiles)?)
    }

    /// Load the remembered session, if one exists and is marked logged in.
    ///
    /// Any parse error or absence yields `None`.
    #[must_use]
    pub fn load_session(&self) -> Option<AuthSession> {
        let raw = fs::read_to_string(&self.session_path).ok()?;
        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) if session.is_logged_in => Some(session),
            Ok(_) => None,
            Err(err) => {
                warn!(
                    "discarding malformed session cache at {}: {err}",
                    self.session_path.display()
                );
                None
            }
        }
    }

    /// Persist the session document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn save_session(&self, session: &AuthSession) -> Result<()> {
        self.write_document(&self.session_path, &serde_json::to_string(session)?)
    }

    /// Remove the session document. Removing an absent document is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be removed.
    pub fn clear_session(&self) -> Result<()> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::CacheWrite {
                path: self.session_path.clone(),
                source: err,
            }),
        }
    }

    fn write_document(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, contents).map_err(|source| Error::CacheWrite {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote cache document {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Theme;

    fn sample_profiles() -> Vec<ChildProfile> {
        vec![
            ChildProfile {
                id: "kid-2".to_string(),
                name: "Mateo".to_string(),
                theme: Theme::Green,
            },
            ChildProfile {
                id: "kid-1".to_string(),
                name: "Ava".to_string(),
                theme: Theme::Blue,
            },
        ]
    }

    #[test]
    fn test_load_profiles_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());
        assert!(store.load_profiles().is_empty());
    }

    #[test]
    fn test_profiles_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        store.save_profiles(&sample_profiles()).unwrap();
        let loaded = store.load_profiles();

        assert_eq!(loaded, sample_profiles());
        assert_eq!(loaded[0].id, "kid-2");
    }

    #[test]
    fn test_load_profiles_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        fs::write(store.profiles_path(), "{not json").unwrap();
        assert!(store.load_profiles().is_empty());
    }

    #[test]
    fn test_load_profiles_non_array_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        fs::write(store.profiles_path(), r#"{"id": "kid-1"}"#).unwrap();
        assert!(store.load_profiles().is_empty());
    }

    #[test]
    fn test_save_profiles_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path().join("nested").join("deeper"));

        store.save_profiles(&sample_profiles()).unwrap();
        assert_eq!(store.load_profiles().len(), 2);
    }

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        let session = AuthSession {
            is_logged_in: true,
            email: "parent@example.com".to_string(),
        };
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session(), Some(session));
    }

    #[test]
    fn test_load_session_requires_logged_in_flag() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        let session = AuthSession {
            is_logged_in: false,
            email: "parent@example.com".to_string(),
        };
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session(), None);
    }

    #[test]
    fn test_load_session_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        fs::write(dir.path().join("session.json"), "][").unwrap();
        assert_eq!(store.load_session(), None);
    }

    #[test]
    fn test_clear_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());

        let session = AuthSession {
            is_logged_in: true,
            email: "parent@example.com".to_string(),
        };
        store.save_session(&session).unwrap();
        store.clear_session().unwrap();
        assert_eq!(store.load_session(), None);
    }

    #[test]
    fn test_clear_session_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::at(dir.path());
        assert!(store.clear_session().is_ok());
    }
}
