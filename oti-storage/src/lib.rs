//! OTI Storage - Storage Traits and Mock Implementations
//!
//! Defines the storage abstraction layer the migration runner talks to:
//! a small durable preference store and the launcher favorites providers.
//! The platform-backed providers live outside this workspace; an LMDB-backed
//! preference store ships in [`lmdb_prefs`].

pub mod lmdb_prefs;

pub use lmdb_prefs::LmdbPreferenceStore;

use oti_core::{
    FavoriteId, MappingVersion, ShortcutRow, StorageError, LAUNCHER2_CONTENT_URI,
    LAUNCHER3_CONTENT_URI, MAPPING_VERSION_KEY,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::RwLock;

// ============================================================================
// LAUNCHER SOURCE LOCATOR
// ============================================================================

/// Locator for one of the two historical launcher favorites providers.
///
/// Recomputed per activation; never persisted. Migration steps process
/// [`LauncherSource::ALL`] in its fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherSource {
    /// Legacy launcher2 provider.
    Launcher2,
    /// Current launcher3 provider.
    Launcher3,
}

impl LauncherSource {
    /// Both known providers, oldest first.
    pub const ALL: [LauncherSource; 2] = [LauncherSource::Launcher2, LauncherSource::Launcher3];

    /// Content URI this locator resolves to.
    pub fn content_uri(self) -> &'static str {
        match self {
            LauncherSource::Launcher2 => LAUNCHER2_CONTENT_URI,
            LauncherSource::Launcher3 => LAUNCHER3_CONTENT_URI,
        }
    }
}

impl fmt::Display for LauncherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LauncherSource::Launcher2 => write!(f, "launcher2"),
            LauncherSource::Launcher3 => write!(f, "launcher3"),
        }
    }
}

// ============================================================================
// STORAGE TRAITS
// ============================================================================

/// Durable key-value preference store, namespace `"oti"`.
///
/// Opened once at component startup and reused; writes are durable commits.
pub trait PreferenceStore: Send + Sync {
    /// Read an integer preference. `Ok(None)` when the key is absent.
    fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError>;

    /// Write an integer preference with a durable commit.
    fn put_u32(&self, key: &str, value: u32) -> Result<(), StorageError>;

    /// Current mapping version, defaulting to 0 when never written.
    fn mapping_version(&self) -> Result<MappingVersion, StorageError> {
        Ok(self.get_u32(MAPPING_VERSION_KEY)?.unwrap_or(0))
    }

    /// Persist the mapping version.
    fn set_mapping_version(&self, version: MappingVersion) -> Result<(), StorageError> {
        self.put_u32(MAPPING_VERSION_KEY, version)
    }
}

/// Read/update access to the launcher favorites providers.
pub trait FavoritesStore: Send + Sync {
    /// Query all shortcut rows of `source`, projected to (row id, intent),
    /// in the store's natural order. `Ok(None)` means the provider is
    /// unavailable, which callers treat as "nothing to migrate".
    ///
    /// The returned rows are owned; any underlying read handle is released
    /// before this call returns.
    fn query_shortcuts(
        &self,
        source: LauncherSource,
    ) -> Result<Option<Vec<ShortcutRow>>, StorageError>;

    /// Rewrite the intent column of the single row matched by
    /// `_id = favorite_id`. Returns the number of rows affected (0 or 1).
    fn update_intent(
        &self,
        source: LauncherSource,
        favorite_id: FavoriteId,
        intent_uri: &str,
    ) -> Result<u64, StorageError>;
}

// ============================================================================
// MOCK IMPLEMENTATIONS
// ============================================================================

/// In-memory preference store for tests.
#[derive(Debug, Default)]
pub struct MockPreferenceStore {
    values: RwLock<HashMap<String, u32>>,
}

impl MockPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MockPreferenceStore {
    fn get_u32(&self, key: &str) -> Result<Option<u32>, StorageError> {
        let values = self.values.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(values.get(key).copied())
    }

    fn put_u32(&self, key: &str, value: u32) -> Result<(), StorageError> {
        let mut values = self.values.write().map_err(|_| StorageError::LockPoisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// In-memory favorites store for tests.
///
/// A source yields rows only after it has been attached; an unattached
/// source models an unreachable provider (the null-cursor case). Individual
/// updates can be made to fail to exercise per-record error handling.
#[derive(Debug, Default)]
pub struct MockFavoritesStore {
    sources: RwLock<HashMap<LauncherSource, Vec<ShortcutRow>>>,
    failing_updates: RwLock<HashSet<(LauncherSource, FavoriteId)>>,
    update_calls: RwLock<u64>,
}

impl MockFavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `source` reachable, with no rows yet.
    pub fn attach_source(&self, source: LauncherSource) {
        self.sources
            .write()
            .expect("mock lock should not be poisoned")
            .entry(source)
            .or_default();
    }

    /// Insert a row into `source`, attaching it if needed. Rows keep
    /// insertion order.
    pub fn insert_shortcut(&self, source: LauncherSource, row: ShortcutRow) {
        self.sources
            .write()
            .expect("mock lock should not be poisoned")
            .entry(source)
            .or_default()
            .push(row);
    }

    /// Make every update of `favorite_id` in `source` fail.
    pub fn fail_updates_for(&self, source: LauncherSource, favorite_id: FavoriteId) {
        self.failing_updates
            .write()
            .expect("mock lock should not be poisoned")
            .insert((source, favorite_id));
    }

    /// Current intent string of a row, for assertions.
    pub fn intent_of(&self, source: LauncherSource, favorite_id: FavoriteId) -> Option<String> {
        self.sources
            .read()
            .expect("mock lock should not be poisoned")
            .get(&source)?
            .iter()
            .find(|row| row.id == favorite_id)
            .map(|row| row.intent.clone())
    }

    /// Number of update calls that reached this store.
    pub fn update_count(&self) -> u64 {
        *self
            .update_calls
            .read()
            .expect("mock lock should not be poisoned")
    }
}

impl FavoritesStore for MockFavoritesStore {
    fn query_shortcuts(
        &self,
        source: LauncherSource,
    ) -> Result<Option<Vec<ShortcutRow>>, StorageError> {
        let sources = self.sources.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(sources.get(&source).cloned())
    }

    fn update_intent(
        &self,
        source: LauncherSource,
        favorite_id: FavoriteId,
        intent_uri: &str,
    ) -> Result<u64, StorageError> {
        if let Ok(mut calls) = self.update_calls.write() {
            *calls += 1;
        }
        let failing = self
            .failing_updates
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        if failing.contains(&(source, favorite_id)) {
            return Err(StorageError::UpdateFailed {
                provider: source.to_string(),
                favorite_id,
                reason: "injected failure".to_string(),
            });
        }
        drop(failing);

        let mut sources = self.sources.write().map_err(|_| StorageError::LockPoisoned)?;
        let rows = match sources.get_mut(&source) {
            Some(rows) => rows,
            None => return Ok(0),
        };
        match rows.iter_mut().find(|row| row.id == favorite_id) {
            Some(row) => {
                row.intent = intent_uri.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_row(id: FavoriteId) -> ShortcutRow {
        ShortcutRow::new(id, format!("#Intent;action=test.ACTION_{id};end"))
    }

    #[test]
    fn test_locator_resolution() {
        assert_eq!(
            LauncherSource::ALL.map(LauncherSource::content_uri),
            [
                "content://com.android.launcher2.settings/favorites?notify=true",
                "content://com.android.launcher3.settings/favorites?notify=true",
            ]
        );
    }

    #[test]
    fn test_mapping_version_defaults_to_zero() {
        let prefs = MockPreferenceStore::new();
        assert_eq!(prefs.mapping_version().unwrap(), 0);
    }

    #[test]
    fn test_mapping_version_round_trip() {
        let prefs = MockPreferenceStore::new();
        prefs.set_mapping_version(1).unwrap();
        assert_eq!(prefs.mapping_version().unwrap(), 1);
    }

    #[test]
    fn test_unattached_source_is_unavailable() {
        let favorites = MockFavoritesStore::new();
        assert_eq!(favorites.query_shortcuts(LauncherSource::Launcher2).unwrap(), None);
    }

    #[test]
    fn test_attached_source_yields_rows_in_order() {
        let favorites = MockFavoritesStore::new();
        favorites.insert_shortcut(LauncherSource::Launcher3, make_test_row(7));
        favorites.insert_shortcut(LauncherSource::Launcher3, make_test_row(3));

        let rows = favorites
            .query_shortcuts(LauncherSource::Launcher3)
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 7);
        assert_eq!(rows[1].id, 3);
    }

    #[test]
    fn test_update_matches_by_id() {
        let favorites = MockFavoritesStore::new();
        favorites.insert_shortcut(LauncherSource::Launcher2, make_test_row(1));
        favorites.insert_shortcut(LauncherSource::Launcher2, make_test_row(2));

        let affected = favorites
            .update_intent(LauncherSource::Launcher2, 2, "#Intent;end")
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(
            favorites.intent_of(LauncherSource::Launcher2, 2).as_deref(),
            Some("#Intent;end")
        );
        // Row 1 untouched.
        assert_eq!(
            favorites.intent_of(LauncherSource::Launcher2, 1),
            Some(make_test_row(1).intent)
        );
    }

    #[test]
    fn test_update_of_missing_row_affects_nothing() {
        let favorites = MockFavoritesStore::new();
        favorites.attach_source(LauncherSource::Launcher2);
        let affected = favorites
            .update_intent(LauncherSource::Launcher2, 42, "#Intent;end")
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn test_injected_update_failure() {
        let favorites = MockFavoritesStore::new();
        favorites.insert_shortcut(LauncherSource::Launcher2, make_test_row(5));
        favorites.fail_updates_for(LauncherSource::Launcher2, 5);

        let result = favorites.update_intent(LauncherSource::Launcher2, 5, "#Intent;end");
        assert!(matches!(result, Err(StorageError::UpdateFailed { .. })));
        // Intent unchanged after the failed update.
        assert_eq!(
            favorites.intent_of(LauncherSource::Launcher2, 5),
            Some(make_test_row(5).intent)
        );
    }

    #[test]
    fn test_sources_are_independent() {
        let favorites = MockFavoritesStore::new();
        favorites.insert_shortcut(LauncherSource::Launcher2, make_test_row(1));

        assert!(favorites
            .query_shortcuts(LauncherSource::Launcher2)
            .unwrap()
            .is_some());
        assert_eq!(favorites.query_shortcuts(LauncherSource::Launcher3).unwrap(), None);
    }
}
