//! OTI Core - Entity Types and Intent Codec
//!
//! Pure data structures, well-known platform constants, and the reversible
//! intent-URI codec. All other crates depend on this.
//! This crate contains no storage or migration logic.

pub mod error;
pub mod intent;

pub use error::{IntentParseError, StorageError};
pub use intent::{ComponentName, IntentDescriptor};

use serde::{Deserialize, Serialize};

// ============================================================================
// WELL-KNOWN PLATFORM CONSTANTS
// ============================================================================

/// Canonical "main entry point" intent action.
pub const ACTION_MAIN: &str = "android.intent.action.MAIN";

/// Category marking an intent as a launcher (home screen) entry.
pub const CATEGORY_LAUNCHER: &str = "android.intent.category.LAUNCHER";

/// Package that used to host the combined dialer/contacts activity.
pub const CONTACTS_PACKAGE: &str = "com.android.contacts";

/// Old combined dialer/contacts activity class.
pub const OLD_DIALTACTS_CLASS: &str = "com.android.contacts.activities.DialtactsActivity";

/// Package hosting the standalone dialer activity.
pub const DIALER_PACKAGE: &str = "com.android.dialer";

/// New standalone dialer activity class.
pub const NEW_DIALTACTS_CLASS: &str = "com.android.dialer.DialtactsActivity";

/// Preference namespace holding initializer state.
pub const PREFS_NAMESPACE: &str = "oti";

/// Preference key for the mapping version counter.
pub const MAPPING_VERSION_KEY: &str = "mapping_version";

/// Content URI of the legacy (launcher2) favorites provider.
pub const LAUNCHER2_CONTENT_URI: &str =
    "content://com.android.launcher2.settings/favorites?notify=true";

/// Content URI of the current (launcher3) favorites provider.
pub const LAUNCHER3_CONTENT_URI: &str =
    "content://com.android.launcher3.settings/favorites?notify=true";

/// Row id column in the favorites projection.
pub const ID_COLUMN: &str = "_id";

/// Serialized intent column in the favorites projection.
pub const INTENT_COLUMN: &str = "intent";

// ============================================================================
// RECORD TYPES
// ============================================================================

/// Row id type used by the favorites providers.
pub type FavoriteId = i64;

/// Mapping version counter. Monotonically non-decreasing across runs.
pub type MappingVersion = u32;

/// A launcher shortcut row, projected to (row id, serialized intent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutRow {
    /// Provider row id. Never changed by a migration.
    pub id: FavoriteId,
    /// Serialized intent descriptor, in intent-URI form.
    pub intent: String,
}

impl ShortcutRow {
    pub fn new(id: FavoriteId, intent: impl Into<String>) -> Self {
        Self {
            id,
            intent: intent.into(),
        }
    }
}
