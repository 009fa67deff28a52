//! DTOs for match creation, listings and the public share-code view.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_timestamp, live::EventSummary, validation::validate_not_blank},
    services::{
        event_feed::newest_first,
        query_engine::{MatchFilter, TimeWindow},
    },
    state::{
        lifecycle::MatchStatus,
        live_match::{LiveMatch, NewMatch, Statistics, Team},
        sport::{SportType, StatisticKind, UnknownName},
    },
};

/// Payload used to open a match for a booked slot.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatchRequest {
    #[validate(custom(function = validate_not_blank))]
    pub name: String,
    /// One of `football`, `cricket`, `basketball`, `tennis`, `badminton`, `other`.
    pub sport_type: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub end_time: OffsetDateTime,
    pub turf_id: String,
    #[serde(default)]
    pub turf_name: String,
    #[validate(custom(function = validate_not_blank))]
    pub owner_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Exactly two entries; the first becomes team index 0.
    #[validate(nested)]
    pub teams: Vec<TeamInput>,
}

impl CreateMatchRequest {
    /// Resolve the sport name and hand the payload to the domain layer.
    pub fn into_new_match(self) -> Result<NewMatch, UnknownName> {
        Ok(NewMatch {
            name: self.name.trim().to_owned(),
            sport_type: self.sport_type.parse()?,
            start_time: self.start_time,
            end_time: self.end_time,
            turf_id: self.turf_id,
            turf_name: self.turf_name,
            owner_id: self.owner_id,
            customer_id: self.customer_id.filter(|id| !id.trim().is_empty()),
            teams: self.teams.into_iter().map(Into::into).collect(),
        })
    }
}

/// Incoming team definition.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TeamInput {
    #[validate(custom(function = validate_not_blank))]
    pub name: String,
    #[serde(default)]
    pub captain: Option<String>,
    #[serde(default)]
    pub players: Vec<String>,
}

impl From<TeamInput> for Team {
    fn from(value: TeamInput) -> Self {
        Self {
            name: value.name.trim().to_owned(),
            score: 0,
            captain: value.captain,
            players: value.players,
        }
    }
}

/// Full projection of a match for operators and participants.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchSummary {
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub status: MatchStatus,
    pub start_time: String,
    pub end_time: String,
    pub turf_id: String,
    pub turf_name: String,
    pub owner_id: String,
    pub customer_id: Option<String>,
    pub share_code: String,
    pub teams: Vec<TeamSummary>,
    pub statistics: Vec<StatisticSummary>,
    /// Newest first.
    pub events: Vec<EventSummary>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&LiveMatch> for MatchSummary {
    fn from(value: &LiveMatch) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            sport_type: value.sport_type,
            status: value.status,
            start_time: format_timestamp(value.start_time),
            end_time: format_timestamp(value.end_time),
            turf_id: value.turf_id.clone(),
            turf_name: value.turf_name.clone(),
            owner_id: value.owner_id.clone(),
            customer_id: value.customer_id.clone(),
            share_code: value.share_code.to_string(),
            teams: team_summaries(value),
            statistics: statistic_summaries(&value.statistics),
            events: newest_first(&value.events)
                .into_iter()
                .map(EventSummary::from)
                .collect(),
            created_at: format_timestamp(value.created_at),
            updated_at: format_timestamp(value.updated_at),
        }
    }
}

/// Team block as exposed over the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamSummary {
    /// Position of the team in the match (0 or 1).
    pub index: u8,
    pub name: String,
    pub score: u32,
    pub captain: Option<String>,
    pub players: Vec<String>,
}

/// One statistic with its per-team values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatisticSummary {
    pub kind: StatisticKind,
    pub team1: u32,
    pub team2: u32,
}

/// Compact listing row.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchListItem {
    pub id: Uuid,
    pub name: String,
    pub sport_type: SportType,
    pub status: MatchStatus,
    pub start_time: String,
    pub end_time: String,
    pub turf_name: String,
    pub share_code: String,
    /// Team names in index order.
    pub teams: Vec<String>,
    /// Scores in index order.
    pub scores: Vec<u32>,
}

impl From<&LiveMatch> for MatchListItem {
    fn from(value: &LiveMatch) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            sport_type: value.sport_type,
            status: value.status,
            start_time: format_timestamp(value.start_time),
            end_time: format_timestamp(value.end_time),
            turf_name: value.turf_name.clone(),
            share_code: value.share_code.to_string(),
            teams: value.teams.iter().map(|team| team.name.clone()).collect(),
            scores: value.teams.iter().map(|team| team.score).collect(),
        }
    }
}

/// Dashboard listing split into the standard windows.
#[derive(Debug, Serialize, ToSchema)]
pub struct BucketsResponse {
    pub today: Vec<MatchListItem>,
    pub upcoming: Vec<MatchListItem>,
    pub live: Vec<MatchListItem>,
    pub completed: Vec<MatchListItem>,
}

/// Read-only projection served to anonymous share-code holders.
///
/// Carries no internal id and no owner or customer reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicMatchView {
    pub share_code: String,
    pub name: String,
    pub sport_type: SportType,
    pub status: MatchStatus,
    pub start_time: String,
    pub end_time: String,
    pub turf_name: String,
    pub teams: Vec<TeamSummary>,
    pub statistics: Vec<StatisticSummary>,
    /// Newest first.
    pub events: Vec<EventSummary>,
    pub updated_at: String,
}

impl From<&LiveMatch> for PublicMatchView {
    fn from(value: &LiveMatch) -> Self {
        Self {
            share_code: value.share_code.to_string(),
            name: value.name.clone(),
            sport_type: value.sport_type,
            status: value.status,
            start_time: format_timestamp(value.start_time),
            end_time: format_timestamp(value.end_time),
            turf_name: value.turf_name.clone(),
            teams: team_summaries(value),
            statistics: statistic_summaries(&value.statistics),
            events: newest_first(&value.events)
                .into_iter()
                .map(EventSummary::from)
                .collect(),
            updated_at: format_timestamp(value.updated_at),
        }
    }
}

/// Query string accepted by the listing routes.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchListQuery {
    pub status: Option<MatchStatus>,
    pub sport_type: Option<SportType>,
    pub owner_id: Option<String>,
    pub customer_id: Option<String>,
    /// Case-insensitive substring of the match or turf name.
    pub q: Option<String>,
    pub window: Option<TimeWindow>,
}

impl From<MatchListQuery> for MatchFilter {
    fn from(value: MatchListQuery) -> Self {
        Self {
            status: value.status,
            sport_type: value.sport_type,
            owner_id: value.owner_id,
            customer_id: value.customer_id,
            text: value.q.filter(|q| !q.trim().is_empty()),
            window: value.window.unwrap_or_default(),
        }
    }
}

fn team_summaries(value: &LiveMatch) -> Vec<TeamSummary> {
    value
        .teams
        .iter()
        .enumerate()
        .map(|(index, team)| TeamSummary {
            index: index as u8,
            name: team.name.clone(),
            score: team.score,
            captain: team.captain.clone(),
            players: team.players.clone(),
        })
        .collect()
}

pub(crate) fn statistic_summaries(statistics: &Statistics) -> Vec<StatisticSummary> {
    statistics
        .iter()
        .map(|(kind, pair)| StatisticSummary {
            kind,
            team1: pair.team1,
            team2: pair.team2,
        })
        .collect()
}
