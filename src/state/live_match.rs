//! Runtime representation of a match and the rules every mutation obeys.
//!
//! The two teams live in a fixed `[Team; 2]` so index 0/1 can never drift; the
//! persisted [`MatchEntity`] uses a plain array and is checked on load.

use indexmap::IndexMap;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::models::{LiveEventEntity, MatchEntity, StatisticEntity, TeamEntity},
    state::{
        lifecycle::{InvalidTransition, MatchStatus, StatusChange},
        share_code::ShareCode,
        sport::{EventKind, SportType, StatisticKind},
    },
};

/// Every match has exactly this many teams.
pub const TEAM_COUNT: usize = 2;
/// `possession.team1 + possession.team2` always equals this value.
pub const POSSESSION_TOTAL: u32 = 100;

/// Validation failures raised before any mutation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchRuleError {
    #[error("a match requires exactly {TEAM_COUNT} teams (got {0})")]
    TeamCount(usize),
    #[error("team index {0} is out of range (expected 0 or 1)")]
    TeamIndexOutOfRange(usize),
    #[error("{0} must not be empty")]
    Blank(&'static str),
    #[error("end time must not precede start time")]
    EndBeforeStart,
    #[error("statistic `{kind}` is not tracked for {sport}")]
    StatisticNotAllowed {
        sport: SportType,
        kind: StatisticKind,
    },
    #[error("event kind `{kind}` is not allowed for {sport}")]
    EventNotAllowed { sport: SportType, kind: EventKind },
}

/// Raised when a persisted record violates structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("match record `{id}` is corrupt: {reason}")]
pub struct CorruptRecord {
    pub id: Uuid,
    pub reason: String,
}

/// Index of a team inside its match (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamIndex(u8);

impl TeamIndex {
    /// Team listed first at creation.
    pub const FIRST: TeamIndex = TeamIndex(0);
    /// Team listed second at creation.
    pub const SECOND: TeamIndex = TeamIndex(1);

    /// Accept `raw` only when it names one of the two teams.
    pub fn new(raw: usize) -> Result<Self, MatchRuleError> {
        if raw < TEAM_COUNT {
            Ok(Self(raw as u8))
        } else {
            Err(MatchRuleError::TeamIndexOutOfRange(raw))
        }
    }

    /// Position in the team array.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Team block of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub score: u32,
    pub captain: Option<String>,
    pub players: Vec<String>,
}

/// Per-team values of a single statistic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatPair {
    pub team1: u32,
    pub team2: u32,
}

impl StatPair {
    /// Even possession split used before any possession delta is recorded.
    pub const EVEN_POSSESSION: StatPair = StatPair {
        team1: POSSESSION_TOTAL / 2,
        team2: POSSESSION_TOTAL / 2,
    };
}

/// Sparse statistic block keyed by kind, in first-recorded order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    entries: IndexMap<StatisticKind, StatPair>,
}

impl Statistics {
    /// Initial block for a sport: possession starts at 50/50 when tracked.
    pub fn for_sport(sport: SportType) -> Self {
        let mut entries = IndexMap::new();
        if sport.vocabulary().allows_statistic(StatisticKind::Possession) {
            entries.insert(StatisticKind::Possession, StatPair::EVEN_POSSESSION);
        }
        Self { entries }
    }

    /// Values for `kind`, or `None` when nothing was recorded for it.
    pub fn get(&self, kind: StatisticKind) -> Option<StatPair> {
        self.entries.get(&kind).copied()
    }

    /// Recorded statistics in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (StatisticKind, StatPair)> + '_ {
        self.entries.iter().map(|(kind, pair)| (*kind, *pair))
    }

    /// Whether no statistic has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply a relative change; vocabulary checks happen in [`LiveMatch::apply_statistic`].
    ///
    /// Possession only moves through team 0: team 1's share is always derived as
    /// `100 - team1`, so the pair stays zero-sum by construction.
    fn apply_delta(&mut self, kind: StatisticKind, team: TeamIndex, delta: i64) -> StatPair {
        let pair = match kind {
            StatisticKind::Possession => {
                let current = self.get(kind).unwrap_or(StatPair::EVEN_POSSESSION);
                let team1 = if team == TeamIndex::FIRST {
                    i64::from(current.team1)
                        .saturating_add(delta)
                        .clamp(0, i64::from(POSSESSION_TOTAL))
                        as u32
                } else {
                    current.team1
                };
                StatPair {
                    team1,
                    team2: POSSESSION_TOTAL - team1,
                }
            }
            _ => {
                let mut pair = self.get(kind).unwrap_or_default();
                if team == TeamIndex::FIRST {
                    pair.team1 = add_clamped(pair.team1, delta);
                } else {
                    pair.team2 = add_clamped(pair.team2, delta);
                }
                pair
            }
        };

        self.entries.insert(kind, pair);
        pair
    }
}

/// `max(0, current + delta)`, saturating at `u32::MAX`.
fn add_clamped(current: u32, delta: i64) -> u32 {
    i64::from(current)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX)) as u32
}

/// Immutable entry of the event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEvent {
    pub sequence: u64,
    pub team_index: Option<TeamIndex>,
    pub kind: EventKind,
    pub player: Option<String>,
    pub description: String,
    pub time_label: String,
    pub recorded_at: OffsetDateTime,
}

/// Caller-supplied fields of an event before the store assigns its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub team_index: Option<TeamIndex>,
    pub kind: EventKind,
    pub player: Option<String>,
    pub description: String,
    pub time_label: String,
}

/// Creation input once the transport layer has parsed it.
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub name: String,
    pub sport_type: SportType,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub turf_id: String,
    pub turf_name: String,
    pub owner_id: String,
    pub customer_id: Option<String>,
    pub teams: Vec<Team>,
}

/// Aggregated state of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMatch {
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub status: MatchStatus,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub turf_id: String,
    pub turf_name: String,
    pub owner_id: String,
    pub customer_id: Option<String>,
    pub share_code: ShareCode,
    pub teams: [Team; TEAM_COUNT],
    pub statistics: Statistics,
    /// Append order, oldest first.
    pub events: Vec<LiveEvent>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl LiveMatch {
    /// Build a scheduled match with a fresh id and an empty feed.
    pub fn create(
        new: NewMatch,
        share_code: ShareCode,
        now: OffsetDateTime,
    ) -> Result<Self, MatchRuleError> {
        if new.name.trim().is_empty() {
            return Err(MatchRuleError::Blank("match name"));
        }
        if new.owner_id.trim().is_empty() {
            return Err(MatchRuleError::Blank("owner id"));
        }
        if new.end_time < new.start_time {
            return Err(MatchRuleError::EndBeforeStart);
        }
        if new.teams.iter().any(|team| team.name.trim().is_empty()) {
            return Err(MatchRuleError::Blank("team name"));
        }

        let count = new.teams.len();
        let teams: [Team; TEAM_COUNT] = new
            .teams
            .try_into()
            .map_err(|_| MatchRuleError::TeamCount(count))?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: new.name,
            sport_type: new.sport_type,
            status: MatchStatus::Scheduled,
            start_time: new.start_time,
            end_time: new.end_time,
            turf_id: new.turf_id,
            turf_name: new.turf_name,
            owner_id: new.owner_id,
            customer_id: new.customer_id,
            share_code,
            teams,
            statistics: Statistics::for_sport(new.sport_type),
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Move to `to` if the lifecycle table allows it; state is untouched otherwise.
    pub fn transition(
        &mut self,
        to: MatchStatus,
        now: OffsetDateTime,
    ) -> Result<StatusChange, InvalidTransition> {
        let change = self.status.transition(to)?;
        self.status = to;
        self.updated_at = now;
        Ok(change)
    }

    /// Apply a score delta and return the new score. Never fails and never goes below zero.
    pub fn apply_score_delta(&mut self, team: TeamIndex, delta: i64, now: OffsetDateTime) -> u32 {
        let slot = &mut self.teams[team.get()];
        slot.score = add_clamped(slot.score, delta);
        self.updated_at = now;
        slot.score
    }

    /// Apply a statistic delta after checking the sport vocabulary.
    pub fn apply_statistic(
        &mut self,
        kind: StatisticKind,
        team: TeamIndex,
        delta: i64,
        now: OffsetDateTime,
    ) -> Result<StatPair, MatchRuleError> {
        if !self.sport_type.vocabulary().allows_statistic(kind) {
            return Err(MatchRuleError::StatisticNotAllowed {
                sport: self.sport_type,
                kind,
            });
        }

        let pair = self.statistics.apply_delta(kind, team, delta);
        self.updated_at = now;
        Ok(pair)
    }

    /// Validate and append an event, assigning the next sequence position.
    pub fn append_event(
        &mut self,
        draft: EventDraft,
        now: OffsetDateTime,
    ) -> Result<LiveEvent, MatchRuleError> {
        if draft.description.trim().is_empty() {
            return Err(MatchRuleError::Blank("event description"));
        }
        if !self.sport_type.vocabulary().allows_event(draft.kind) {
            return Err(MatchRuleError::EventNotAllowed {
                sport: self.sport_type,
                kind: draft.kind,
            });
        }

        let event = LiveEvent {
            sequence: self.next_sequence(),
            team_index: draft.team_index,
            kind: draft.kind,
            player: draft.player,
            description: draft.description,
            time_label: draft.time_label,
            recorded_at: now,
        };

        self.events.push(event.clone());
        self.updated_at = now;
        Ok(event)
    }

    fn next_sequence(&self) -> u64 {
        self.events.last().map_or(1, |event| event.sequence + 1)
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            name: value.name,
            score: value.score,
            captain: value.captain,
            players: value.players,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            name: value.name,
            score: value.score,
            captain: value.captain,
            players: value.players,
        }
    }
}

impl From<LiveEvent> for LiveEventEntity {
    fn from(value: LiveEvent) -> Self {
        Self {
            sequence: value.sequence,
            team_index: value.team_index.map(|index| index.0),
            kind: value.kind,
            player: value.player,
            description: value.description,
            time_label: value.time_label,
            recorded_at: value.recorded_at.into(),
        }
    }
}

impl From<LiveMatch> for MatchEntity {
    fn from(value: LiveMatch) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport_type: value.sport_type,
            status: value.status,
            start_time: value.start_time.into(),
            end_time: value.end_time.into(),
            turf_id: value.turf_id,
            turf_name: value.turf_name,
            owner_id: value.owner_id,
            customer_id: value.customer_id,
            share_code: value.share_code.into_inner(),
            teams: value.teams.into_iter().map(Into::into).collect(),
            statistics: value
                .statistics
                .iter()
                .map(|(kind, pair)| StatisticEntity {
                    kind,
                    team1: pair.team1,
                    team2: pair.team2,
                })
                .collect(),
            events: value.events.into_iter().map(Into::into).collect(),
            created_at: value.created_at.into(),
            updated_at: value.updated_at.into(),
        }
    }
}

impl TryFrom<MatchEntity> for LiveMatch {
    type Error = CorruptRecord;

    fn try_from(value: MatchEntity) -> Result<Self, Self::Error> {
        let id = value.id;
        let corrupt = |reason: String| CorruptRecord { id, reason };

        let team_count = value.teams.len();
        let teams: [Team; TEAM_COUNT] = value
            .teams
            .into_iter()
            .map(Team::from)
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| corrupt(format!("expected {TEAM_COUNT} teams, found {team_count}")))?;

        let share_code = ShareCode::parse(&value.share_code)
            .ok_or_else(|| corrupt("malformed share code".into()))?;

        let mut last_sequence = 0;
        let mut events = Vec::with_capacity(value.events.len());
        for event in value.events {
            if event.sequence <= last_sequence {
                return Err(corrupt(format!(
                    "event sequence {} does not follow {last_sequence}",
                    event.sequence
                )));
            }
            last_sequence = event.sequence;

            let team_index = event
                .team_index
                .map(|raw| TeamIndex::new(raw as usize))
                .transpose()
                .map_err(|err| corrupt(err.to_string()))?;

            events.push(LiveEvent {
                sequence: event.sequence,
                team_index,
                kind: event.kind,
                player: event.player,
                description: event.description,
                time_label: event.time_label,
                recorded_at: event.recorded_at.into(),
            });
        }

        let mut entries = IndexMap::with_capacity(value.statistics.len());
        for entry in value.statistics {
            let pair = StatPair {
                team1: entry.team1,
                team2: entry.team2,
            };
            if entry.kind == StatisticKind::Possession
                && pair.team1.checked_add(pair.team2) != Some(POSSESSION_TOTAL)
            {
                return Err(corrupt(format!(
                    "possession {}/{} does not sum to {POSSESSION_TOTAL}",
                    pair.team1, pair.team2
                )));
            }
            if entries.insert(entry.kind, pair).is_some() {
                return Err(corrupt(format!("statistic `{}` stored twice", entry.kind)));
            }
        }
        let statistics = Statistics { entries };

        Ok(Self {
            id,
            name: value.name,
            sport_type: value.sport_type,
            status: value.status,
            start_time: value.start_time.into(),
            end_time: value.end_time.into(),
            turf_id: value.turf_id,
            turf_name: value.turf_name,
            owner_id: value.owner_id,
            customer_id: value.customer_id,
            share_code,
            teams,
            statistics,
            events,
            created_at: value.created_at.into(),
            updated_at: value.updated_at.into(),
        })
    }
}
