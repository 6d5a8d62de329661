//! Error types for the Kizuna companion engine.
//!
//! Admission-control failures (cooldown, energy, eligibility, session
//! conflicts) are expected, recoverable outcomes: they are returned as
//! values, never panic, and never mutate state. Collaborator failures
//! carry their source and are isolated to the call that triggered them.

use thiserror::Error;

use crate::collab::CollabError;
use crate::types::Stat;

/// Top-level error type for all engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The activity's type-wide cooldown window has not elapsed.
    #[error("{kind} activities are on cooldown for another {}s", .remaining.num_seconds())]
    OnCooldown {
        /// Which activity type is cooling down.
        kind: crate::activity::ActivityKind,
        /// Time left before the next attempt is admitted.
        remaining: chrono::Duration,
    },

    /// Not enough energy to pay the activity's cost.
    #[error("insufficient energy: need {required}, have {available}")]
    InsufficientEnergy {
        /// Energy the activity costs.
        required: f32,
        /// Energy currently available.
        available: f32,
    },

    /// An exercise session is already in progress.
    #[error("an exercise session is already active")]
    SessionAlreadyActive,

    /// No exercise session is in progress.
    #[error("no exercise session is active")]
    NoActiveSession,

    /// The profile's stats do not meet the exercise's minimums.
    #[error("not ready for exercise {exercise}: missing {missing:?}")]
    Ineligible {
        /// Exercise id.
        exercise: String,
        /// Which stat minimums are unmet.
        missing: Vec<Stat>,
    },

    /// The trait cannot be unlocked yet (stage gate, stat minimums, or
    /// already unlocked).
    #[error("trait {trait_id} is not eligible to unlock")]
    NotEligible {
        /// Trait catalog id.
        trait_id: String,
    },

    /// No trait with this id exists in the catalog.
    #[error("unknown trait: {0}")]
    UnknownTrait(String),

    /// The long-term memory store could not complete a call. Short-term
    /// state has already been updated and is not rolled back.
    #[error("long-term store unavailable during {operation}")]
    StorageUnavailable {
        /// Which store call failed (persist, search, purge).
        operation: String,
        /// Underlying collaborator failure.
        #[source]
        source: CollabError,
    },

    /// The text-generation collaborator could not complete a call.
    #[error("text generation unavailable")]
    GenerationUnavailable {
        /// Underlying collaborator failure.
        #[source]
        source: CollabError,
    },

    /// The speech-synthesis collaborator could not complete a call.
    #[error("speech synthesis unavailable")]
    SynthesisUnavailable {
        /// Underlying collaborator failure.
        #[source]
        source: CollabError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic I/O error (config file loading).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
