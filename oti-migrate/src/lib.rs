//! OTI Migrate - One-Time Migration Runner
//!
//! Performs one-time initialization after installation. The platform offers
//! no install hook, so the host delivers the first boot-completed event to
//! [`OneTimeInitializer`] instead; the runner then applies every migration
//! step whose target version is above the stored mapping version and
//! persists the highest version reached, so no step ever runs twice.
//!
//! Per-record failures inside a step are logged and skipped; they never fail
//! the run, and the version still advances past a partially-failed step.

pub mod relink;
pub mod runner;

pub use relink::RelinkDialerShortcuts;
pub use runner::{
    MigrationRunner, MigrationStep, OneTimeInitializer, RunReport, StepOutcome, StepReport,
};
