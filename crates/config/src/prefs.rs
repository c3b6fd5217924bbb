//! Persisted user preference store — two values (gender, setup flag) in a
//! small TOML file next to the app config.
//!
//! Every operation is fallible and says so; a store that cannot be read or
//! written surfaces an error at the call site instead of silently falling
//! back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Stored gender preference used by the personalization transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    #[default]
    Unset,
    Male,
    Female,
    Other,
}

impl GenderPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderPreference::Unset => "unset",
            GenderPreference::Male => "male",
            GenderPreference::Female => "female",
            GenderPreference::Other => "other",
        }
    }

    /// Whether the personalization transform rewrites anything for this
    /// preference.  `unset` and `other` are identity.
    pub fn is_personalizing(&self) -> bool {
        matches!(self, GenderPreference::Male | GenderPreference::Female)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub gender: GenderPreference,
    pub setup_completed: bool,
}

/// File-backed store for [`Preferences`].
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored preferences.  A missing file means first run and
    /// yields the defaults; an unreadable or malformed file is an error.
    pub fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read preference store {}", self.path.display()))?;
        let prefs = toml::from_str(&raw)
            .with_context(|| format!("parse preference store {}", self.path.display()))?;
        Ok(prefs)
    }

    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create preference dir {}", parent.display()))?;
        }
        let rendered = toml::to_string_pretty(prefs)?;
        fs::write(&self.path, rendered)
            .with_context(|| format!("write preference store {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the stored preferences; the next load sees first-run defaults.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("remove preference store {}", self.path.display()))?;
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::new(dir.path().join("preferences.toml"))
    }

    #[test]
    fn load_missing_file_returns_first_run_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = store_in(&dir).load().unwrap();
        assert_eq!(prefs.gender, GenderPreference::Unset);
        assert!(!prefs.setup_completed);
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&Preferences {
                gender: GenderPreference::Female,
                setup_completed: true,
            })
            .unwrap();

        let prefs = store.load().unwrap();
        assert_eq!(prefs.gender, GenderPreference::Female);
        assert!(prefs.setup_completed);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::new(dir.path().join("a/b/preferences.toml"));
        store.save(&Preferences::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn clear_resets_to_first_run() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&Preferences {
                gender: GenderPreference::Male,
                setup_completed: true,
            })
            .unwrap();
        store.clear().unwrap();

        let prefs = store.load().unwrap();
        assert_eq!(prefs.gender, GenderPreference::Unset);
        assert!(!prefs.setup_completed);
    }

    #[test]
    fn clear_on_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).clear().unwrap();
    }

    #[test]
    fn malformed_store_is_an_error_not_a_default() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "gender = 42").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn gender_preference_serializes_lowercase() {
        for (pref, label) in [
            (GenderPreference::Unset, "\"unset\""),
            (GenderPreference::Male, "\"male\""),
            (GenderPreference::Female, "\"female\""),
            (GenderPreference::Other, "\"other\""),
        ] {
            let json = serde_json::to_string(&pref).unwrap();
            assert_eq!(json, label);
            let back: GenderPreference = serde_json::from_str(&json).unwrap();
            assert_eq!(back, pref);
        }
    }

    #[test]
    fn only_male_and_female_personalize() {
        assert!(GenderPreference::Male.is_personalizing());
        assert!(GenderPreference::Female.is_personalizing());
        assert!(!GenderPreference::Unset.is_personalizing());
        assert!(!GenderPreference::Other.is_personalizing());
    }
}
