//! Error types for OTI operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Update failed for favorite {favorite_id} in {provider}: {reason}")]
    UpdateFailed {
        provider: String,
        favorite_id: i64,
        reason: String,
    },

    #[error("Invalid stored value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Backend error: {reason}")]
    Backend { reason: String },
}

/// Intent-URI decode errors.
///
/// Decoding is total over arbitrary input: every malformed input maps to one
/// of these variants, never a panic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntentParseError {
    #[error("Intent URI has no #Intent; fragment")]
    MissingFragment,

    #[error("Intent fragment not terminated with 'end'")]
    UnterminatedFragment,

    #[error("Malformed intent segment: {segment}")]
    MalformedSegment { segment: String },

    #[error("Invalid launchFlags value: {value}")]
    InvalidLaunchFlags { value: String },

    #[error("Invalid component name: {value}")]
    InvalidComponent { value: String },
}
