//! Migration step: relink launcher shortcuts of the old combined
//! dialer/contacts activity to the standalone dialer activity.
//!
//! Both historical favorites providers are scanned in fixed order, oldest
//! first. Rows pass a cheap textual pre-filter before the authoritative
//! structured check; the pre-filter alone never justifies a rewrite.

use oti_core::{
    ComponentName, IntentDescriptor, IntentParseError, ShortcutRow, StorageError, ACTION_MAIN,
    CATEGORY_LAUNCHER, CONTACTS_PACKAGE, DIALER_PACKAGE, NEW_DIALTACTS_CLASS, OLD_DIALTACTS_CLASS,
};
use oti_storage::{FavoritesStore, LauncherSource};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::runner::{MigrationStep, StepReport};

/// Failure while relinking a single row. Always absorbed by the scan loop.
#[derive(Debug, Error)]
enum RelinkError {
    #[error(transparent)]
    Parse(#[from] IntentParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Target version 1: rewrite old dialer/contacts shortcuts to the new
/// dialer activity.
pub struct RelinkDialerShortcuts;

impl RelinkDialerShortcuts {
    fn relink_source(
        &self,
        favorites: &dyn FavoritesStore,
        source: LauncherSource,
        report: &mut StepReport,
    ) {
        let rows = match favorites.query_shortcuts(source) {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                // Provider unreachable: nothing to migrate here.
                debug!(%source, "favorites provider unavailable, skipping");
                return;
            }
            Err(e) => {
                error!(%source, error = %e, "favorites query failed, skipping source");
                return;
            }
        };
        debug!(%source, total = rows.len(), "scanning launcher icons");

        for row in rows {
            report.scanned += 1;

            // Odds are this one isn't it, skip it if possible.
            if !row.intent.contains(OLD_DIALTACTS_CLASS)
                || !row.intent.contains(CATEGORY_LAUNCHER)
            {
                continue;
            }

            match relink_row(favorites, source, &row) {
                Ok(true) => {
                    report.rewritten += 1;
                    info!(%source, favorite_id = row.id, "relinked shortcut to dialer activity");
                }
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    error!(%source, favorite_id = row.id, error = %e, "problem moving dialer shortcut");
                }
            }
        }
    }
}

/// Parse, authoritatively match, and rewrite one row. Returns whether the
/// row was rewritten.
fn relink_row(
    favorites: &dyn FavoritesStore,
    source: LauncherSource,
    row: &ShortcutRow,
) -> Result<bool, RelinkError> {
    let mut descriptor = IntentDescriptor::decode(&row.intent)?;

    let matched = descriptor.action.as_deref() == Some(ACTION_MAIN)
        && descriptor.component.as_ref().is_some_and(|component| {
            component.package == CONTACTS_PACKAGE && component.class == OLD_DIALTACTS_CLASS
        })
        && descriptor.has_category(CATEGORY_LAUNCHER);
    if !matched {
        return Ok(false);
    }

    descriptor.component = Some(ComponentName::new(DIALER_PACKAGE, NEW_DIALTACTS_CLASS));
    favorites.update_intent(source, row.id, &descriptor.encode())?;
    Ok(true)
}

impl MigrationStep for RelinkDialerShortcuts {
    fn target_version(&self) -> oti_core::MappingVersion {
        1
    }

    fn name(&self) -> &'static str {
        "relink-dialer-shortcuts"
    }

    fn apply(&self, favorites: &dyn FavoritesStore) -> StepReport {
        let mut report = StepReport::default();
        // Fixed order, oldest provider first; the newer one is always
        // covered as well.
        for source in LauncherSource::ALL {
            self.relink_source(favorites, source, &mut report);
        }
        report
    }
}
