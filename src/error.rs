//! Engine error types
//!
//! Every variant is a local, recoverable condition surfaced to the caller
//! of `choose_action`. A rejected action performs no mutation: the turn
//! stays open and the caller may resubmit.

use thiserror::Error;

/// Errors surfaced by the combat engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// Malformed dice request or notation
    #[error("invalid dice request: {0}")]
    InvalidParameter(String),

    /// Timed modifier with a non-positive duration
    #[error("invalid modifier: {0}")]
    InvalidModifier(String),

    /// No spell slot or charge remaining
    #[error("insufficient resource: {0}")]
    InsufficientResource(String),

    /// Inventory collaborator denied the item
    #[error("item unavailable: {0}")]
    ItemUnavailable(String),

    /// Action submitted for a combatant that cannot act on it
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// Action submitted after the session concluded
    #[error("session already concluded")]
    AlreadyConcluded,
}
