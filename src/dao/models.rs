use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    lifecycle::MatchStatus,
    sport::{EventKind, SportType, StatisticKind},
};

/// Team block embedded in a match record. Position in the array is the team index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Display name of the team.
    pub name: String,
    /// Current score, never negative.
    pub score: u32,
    /// Optional captain name.
    pub captain: Option<String>,
    /// Ordered roster; may be empty.
    pub players: Vec<String>,
}

/// One populated statistic with its per-team values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatisticEntity {
    pub kind: StatisticKind,
    pub team1: u32,
    pub team2: u32,
}

/// Immutable live update stored in the match event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveEventEntity {
    /// Store-assigned position, strictly increasing per match.
    pub sequence: u64,
    /// Team the event relates to; `None` for match-wide entries.
    pub team_index: Option<u8>,
    pub kind: EventKind,
    pub player: Option<String>,
    pub description: String,
    /// Free-text clock label such as `45'`.
    pub time_label: String,
    pub recorded_at: SystemTime,
}

/// Aggregate match record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub status: MatchStatus,
    pub start_time: SystemTime,
    pub end_time: SystemTime,
    /// Turf reference supplied by the booking system.
    pub turf_id: String,
    /// Turf display name, searched by free-text queries.
    pub turf_name: String,
    /// Operator that owns the booking.
    pub owner_id: String,
    /// Participant who booked the slot, if any.
    pub customer_id: Option<String>,
    /// Unique, immutable share code (indexed).
    pub share_code: String,
    /// Always two entries once validated.
    pub teams: Vec<TeamEntity>,
    pub statistics: Vec<StatisticEntity>,
    /// Append-only, oldest first.
    pub events: Vec<LiveEventEntity>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}
