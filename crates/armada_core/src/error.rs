//! Error types for the resolution core.

use thiserror::Error;

use crate::construction::JobId;
use crate::encounter::EncounterId;
use crate::players::PlayerId;
use crate::structures::StructureId;
use crate::units::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all resolution-core errors.
///
/// Validation rejections are *not* errors — they are [`crate::validator::RejectReason`]
/// values surfaced to the order's issuer. `GameError` covers programming-contract
/// violations and infrastructure failures (serialization, config parsing).
#[derive(Debug, Error)]
pub enum GameError {
    /// Referenced unit does not exist.
    #[error("Unit not found: {0}")]
    UnitNotFound(UnitId),

    /// Referenced structure does not exist.
    #[error("Structure not found: {0}")]
    StructureNotFound(StructureId),

    /// Referenced player does not exist.
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// Referenced construction job does not exist.
    #[error("Construction job not found: {0}")]
    JobNotFound(JobId),

    /// Referenced encounter does not exist or was already resolved.
    #[error("Encounter not found or already resolved: {0}")]
    EncounterNotFound(EncounterId),

    /// A decision was recorded for a unit that is not party to the encounter.
    #[error("Unit {unit} is not involved in encounter {encounter}")]
    UnitNotInvolved {
        /// The encounter the decision targeted.
        encounter: EncounterId,
        /// The unit the decision was recorded for.
        unit: UnitId,
    },

    /// A decision of the wrong family was recorded against an encounter
    /// (e.g. a YIELD against a PASSING encounter).
    #[error("Decision {decision} is not valid for a {kind} encounter")]
    WrongDecisionKind {
        /// The encounter kind the decision was recorded against.
        kind: &'static str,
        /// The offending decision.
        decision: &'static str,
    },

    /// Player cannot afford a debit.
    #[error("Insufficient gold: need {required}, have {available}")]
    InsufficientGold {
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Rules configuration failed to parse.
    #[error("Failed to parse rules config: {0}")]
    ConfigParse(String),
}
