//! Version-gated migration runner.
//!
//! Steps form an ordered list keyed by target version, applied in ascending
//! order while the stored mapping version is below the step's target. The
//! new version is persisted unconditionally as the run's last action, even
//! when no step executed or a step reported per-record failures.

use std::sync::Arc;

use oti_core::{MappingVersion, StorageError};
use oti_storage::{FavoritesStore, PreferenceStore};
use tracing::{debug, info};

use crate::relink::RelinkDialerShortcuts;

/// One migration step, gated by a target mapping version.
pub trait MigrationStep: Send + Sync {
    /// Mapping version this step brings the device to.
    fn target_version(&self) -> MappingVersion;

    /// Stable name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Apply the step. Infallible by contract: per-record failures are
    /// logged, counted in the report, and skipped.
    fn apply(&self, favorites: &dyn FavoritesStore) -> StepReport;
}

/// Counters for one applied step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Rows read from the providers.
    pub scanned: u64,
    /// Rows whose intent was rewritten.
    pub rewritten: u64,
    /// Rows skipped after a decode or update failure.
    pub failed: u64,
}

/// Name and counters of one applied step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub name: &'static str,
    pub report: StepReport,
}

/// Result of a full runner pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Mapping version read at activation start.
    pub from_version: MappingVersion,
    /// Mapping version persisted at activation end.
    pub to_version: MappingVersion,
    /// Steps applied this run, in order.
    pub steps: Vec<StepOutcome>,
}

/// Applies pending migration steps and maintains the mapping version.
pub struct MigrationRunner {
    prefs: Arc<dyn PreferenceStore>,
    favorites: Arc<dyn FavoritesStore>,
    steps: Vec<Box<dyn MigrationStep>>,
}

impl MigrationRunner {
    /// Runner with the standard step list.
    pub fn new(prefs: Arc<dyn PreferenceStore>, favorites: Arc<dyn FavoritesStore>) -> Self {
        Self::with_steps(prefs, favorites, vec![Box::new(RelinkDialerShortcuts)])
    }

    /// Runner with an explicit step list; steps are ordered by ascending
    /// target version.
    pub fn with_steps(
        prefs: Arc<dyn PreferenceStore>,
        favorites: Arc<dyn FavoritesStore>,
        mut steps: Vec<Box<dyn MigrationStep>>,
    ) -> Self {
        steps.sort_by_key(|step| step.target_version());
        Self {
            prefs,
            favorites,
            steps,
        }
    }

    /// One full pass: read version, apply pending steps, persist the highest
    /// version reached.
    ///
    /// Only preference-store I/O can fail here; step-internal record
    /// failures are absorbed into the report.
    pub fn run(&self) -> Result<RunReport, StorageError> {
        let from_version = self.prefs.mapping_version()?;
        let mut report = RunReport {
            from_version,
            to_version: from_version,
            steps: Vec::new(),
        };

        for step in &self.steps {
            let target = step.target_version();
            if from_version >= target {
                continue;
            }
            info!(step = step.name(), target, "applying migration step");
            let step_report = step.apply(self.favorites.as_ref());
            debug!(
                step = step.name(),
                scanned = step_report.scanned,
                rewritten = step_report.rewritten,
                failed = step_report.failed,
                "migration step finished"
            );
            report.steps.push(StepOutcome {
                name: step.name(),
                report: step_report,
            });
            report.to_version = report.to_version.max(target);
        }

        // Last action of every run, also when nothing was pending.
        self.prefs.set_mapping_version(report.to_version)?;
        debug!(
            from_version,
            to_version = report.to_version,
            "mapping version persisted"
        );
        Ok(report)
    }
}

/// Boot-triggered entry point.
///
/// Constructed once with both store handles (the preference store is opened
/// at component startup and reused); the host's boot-completed event carries
/// no parameters and is serialized by the platform, so no locking happens
/// here.
pub struct OneTimeInitializer {
    runner: MigrationRunner,
}

impl OneTimeInitializer {
    pub fn new(prefs: Arc<dyn PreferenceStore>, favorites: Arc<dyn FavoritesStore>) -> Self {
        Self {
            runner: MigrationRunner::new(prefs, favorites),
        }
    }

    /// Handle the boot-completed event.
    pub fn handle_boot_completed(&self) -> Result<RunReport, StorageError> {
        debug!("boot completed, checking mapping version");
        self.runner.run()
    }
}
