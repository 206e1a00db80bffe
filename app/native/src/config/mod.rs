//! Settings module for Banners.
//!
//! This module provides the settings types, loading functionality, a shared
//! settings store, and file watching for hot-reloading settings changes.
//!
//! The settings file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! There is no process-wide settings singleton: callers own a [`SettingsStore`]
//! and the lifecycle controller takes a fresh snapshot at the start of every
//! resolution, so a save is visible on the next scheduled update.

pub mod template;
pub mod types;
mod watcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
pub use types::{
    BannerSettings, BannerStyle, HeaderDecor, HorizontalAlign, SettingsError, TagRule,
    VerticalAlign, load_settings, load_settings_from_path, save_settings, settings_paths,
};
pub use watcher::watch_settings_file;

/// Shared, cheaply clonable handle to the current settings.
///
/// Readers take snapshots; writers replace the record and optionally persist it.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<BannerSettings>>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// Creates an in-memory store.
    #[must_use]
    pub fn new(settings: BannerSettings) -> Self {
        Self { inner: Arc::new(RwLock::new(settings)), path: None }
    }

    /// Creates a store backed by a settings file.
    #[must_use]
    pub fn with_path(settings: BannerSettings, path: PathBuf) -> Self {
        Self { inner: Arc::new(RwLock::new(settings)), path: Some(path) }
    }

    /// Loads settings for a vault, falling back to defaults.
    ///
    /// An explicit `path` wins over the search locations. When nothing is found,
    /// the store is bound to the vault-local file (or the first search path) so a
    /// later [`SettingsStore::save`] creates it.
    #[must_use]
    pub fn load(path: Option<&Path>, vault: Option<&Path>) -> Self {
        let result = match path {
            Some(path) => load_settings_from_path(path).map(|s| (s, path.to_path_buf())),
            None => load_settings(vault),
        };

        match result {
            Ok((settings, path)) => {
                tracing::debug!(path = %path.display(), "loaded settings");
                Self::with_path(settings, path)
            }
            Err(err) => {
                if !matches!(err, SettingsError::NotFound) {
                    tracing::warn!(error = %err, "failed to load settings, using defaults");
                }
                let fallback = path
                    .map(Path::to_path_buf)
                    .or_else(|| settings_paths(vault).into_iter().next());
                Self { inner: Arc::new(RwLock::new(BannerSettings::default())), path: fallback }
            }
        }
    }

    /// Returns a copy of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> BannerSettings { self.inner.read().clone() }

    /// Replaces the current settings.
    pub fn replace(&self, settings: BannerSettings) { *self.inner.write() = settings; }

    /// Applies an in-place update.
    pub fn update<F: FnOnce(&mut BannerSettings)>(&self, f: F) { f(&mut self.inner.write()); }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Persists the current settings to the backing file.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NotFound` when the store has no backing file, or
    /// the underlying write error.
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NotFound);
        };
        save_settings(path, &self.snapshot())?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Re-reads the backing file, keeping the current settings on failure.
    ///
    /// Returns `true` if the settings changed.
    pub fn reload(&self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };
        match load_settings_from_path(path) {
            Ok(settings) => {
                let mut guard = self.inner.write();
                let changed = *guard != settings;
                *guard = settings;
                changed
            }
            Err(err) => {
                tracing::warn!(error = %err, path = %path.display(), "failed to reload settings");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_detached() {
        let store = SettingsStore::new(BannerSettings::default());
        let snapshot = store.snapshot();
        store.update(|s| s.frontmatter_property = "cover".to_string());
        assert_eq!(snapshot.frontmatter_property, "banner");
        assert_eq!(store.snapshot().frontmatter_property, "cover");
    }

    #[test]
    fn test_clones_share_state() {
        let store = SettingsStore::new(BannerSettings::default());
        let other = store.clone();
        other.update(|s| s.enable_banners = false);
        assert!(!store.snapshot().enable_banners);
    }

    #[test]
    fn test_save_without_path_fails() {
        let store = SettingsStore::new(BannerSettings::default());
        assert!(matches!(store.save(), Err(SettingsError::NotFound)));
    }

    #[test]
    fn test_load_missing_explicit_path_binds_to_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::load(Some(&path), None);
        assert_eq!(store.snapshot(), BannerSettings::default());
        assert_eq!(store.path(), Some(path.as_path()));

        store.update(|s| s.banner_folder = "banners".to_string());
        store.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        save_settings(&path, &BannerSettings::default()).unwrap();

        let store = SettingsStore::load(Some(&path), None);
        assert!(!store.reload());

        let mut changed = BannerSettings::default();
        changed.show_in_popovers = false;
        save_settings(&path, &changed).unwrap();
        assert!(store.reload());
        assert!(!store.snapshot().show_in_popovers);
    }

    #[test]
    fn test_load_prefers_vault_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = BannerSettings::default();
        settings.frontmatter_property = "hero".to_string();
        save_settings(&dir.path().join(".banners.jsonc"), &settings).unwrap();

        let store = SettingsStore::load(None, Some(dir.path()));
        assert_eq!(store.snapshot().frontmatter_property, "hero");
    }
}
