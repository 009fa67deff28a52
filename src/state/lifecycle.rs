use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Initial state: booked but not started (also the target of a revert).
    Scheduled,
    /// Play is under way; public viewers keep polling.
    Live,
    /// Terminal: the match ended normally.
    Completed,
    /// Terminal: the match was called off.
    Cancelled,
}

/// Named status change produced by a valid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    /// `scheduled -> live`.
    Start,
    /// `live -> scheduled`, requested by the operator to undo a start.
    Revert,
    /// `live -> completed`.
    End,
    /// `scheduled | live -> cancelled`.
    Cancel,
}

/// Error returned when a requested status is not reachable from the current one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: cannot move from {from:?} to {to:?}")]
pub struct InvalidTransition {
    /// Status the match was in when the request arrived.
    pub from: MatchStatus,
    /// Status that was requested.
    pub to: MatchStatus,
}

impl MatchStatus {
    /// Whether no further transition can leave this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    /// Validate a move to `to`, returning the named change on success.
    ///
    /// Only the table below is legal; everything else, including staying in the
    /// same status, is rejected.
    pub fn transition(self, to: MatchStatus) -> Result<StatusChange, InvalidTransition> {
        let change = match (self, to) {
            (MatchStatus::Scheduled, MatchStatus::Live) => StatusChange::Start,
            (MatchStatus::Live, MatchStatus::Scheduled) => StatusChange::Revert,
            (MatchStatus::Live, MatchStatus::Completed) => StatusChange::End,
            (MatchStatus::Scheduled | MatchStatus::Live, MatchStatus::Cancelled) => {
                StatusChange::Cancel
            }
            (from, to) => return Err(InvalidTransition { from, to }),
        };

        Ok(change)
    }
}
