//! DTOs for live operator actions: status changes, score and statistic deltas, the event feed.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_timestamp, matches::StatisticSummary, validation::validate_not_blank},
    error::ServiceError,
    state::{
        lifecycle::{MatchStatus, StatusChange},
        live_match::{EventDraft, LiveEvent, TeamIndex},
        sport::{EventKind, StatisticKind},
    },
};

/// Request to move a match to another lifecycle status.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: MatchStatus,
}

/// Outcome of an accepted status change.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeResponse {
    pub id: Uuid,
    pub status: MatchStatus,
    pub change: StatusChange,
}

/// Request to adjust a team's score by a delta.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScoreAdjustmentRequest {
    pub team_index: usize,
    pub delta: i64,
}

/// Result of a score adjustment, returning the updated tally.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScoreUpdateResponse {
    pub team_index: usize,
    pub score: u32,
}

/// Request to adjust one statistic for one team.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatisticAdjustmentRequest {
    /// Statistic name, e.g. `shots_on_target`.
    pub kind: String,
    pub team_index: usize,
    pub delta: i64,
}

/// Full statistics block after an adjustment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatisticsResponse {
    pub statistics: Vec<StatisticSummary>,
}

/// Operator-entered live update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct AppendEventRequest {
    /// Omit for match-wide updates.
    #[serde(default)]
    pub team_index: Option<usize>,
    /// Event kind name; defaults to `general`.
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
    #[validate(custom(function = validate_not_blank))]
    pub description: String,
    /// Free-text clock label such as `45'`.
    #[serde(default)]
    pub time_label: String,
}

impl AppendEventRequest {
    /// Resolve names and indexes into a domain draft.
    pub fn into_draft(self) -> Result<EventDraft, ServiceError> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => EventKind::General,
            Some(name) => name.parse()?,
        };
        let team_index = self
            .team_index
            .map(TeamIndex::new)
            .transpose()?;

        Ok(EventDraft {
            team_index,
            kind,
            player: self.player.filter(|player| !player.trim().is_empty()),
            description: self.description.trim().to_owned(),
            time_label: self.time_label.trim().to_owned(),
        })
    }
}

/// Parse a statistic name from a request body.
pub fn parse_statistic(name: &str) -> Result<StatisticKind, ServiceError> {
    Ok(name.parse()?)
}

/// One entry of the live feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    pub sequence: u64,
    pub team_index: Option<u8>,
    pub kind: EventKind,
    pub player: Option<String>,
    pub description: String,
    pub time_label: String,
    pub recorded_at: String,
}

impl From<&LiveEvent> for EventSummary {
    fn from(value: &LiveEvent) -> Self {
        Self {
            sequence: value.sequence,
            team_index: value.team_index.map(|index| index.get() as u8),
            kind: value.kind,
            player: value.player.clone(),
            description: value.description.clone(),
            time_label: value.time_label.clone(),
            recorded_at: format_timestamp(value.recorded_at),
        }
    }
}

/// Query string of the event feed route.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Only return the trailing `last` events.
    pub last: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: Option<&str>, team_index: Option<usize>) -> AppendEventRequest {
        AppendEventRequest {
            team_index,
            kind: kind.map(Into::into),
            player: Some("  ".into()),
            description: " Free kick ".into(),
            time_label: "23'".into(),
        }
    }

    #[test]
    fn missing_kind_defaults_to_general() {
        let draft = request(None, None).into_draft().unwrap();
        assert_eq!(draft.kind, EventKind::General);
        assert_eq!(draft.description, "Free kick");
        assert_eq!(draft.player, None);
    }

    #[test]
    fn unknown_kind_and_bad_index_are_validation_errors() {
        assert!(matches!(
            request(Some("touchdown"), None).into_draft(),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            request(Some("goal"), Some(2)).into_draft(),
            Err(ServiceError::Validation(_))
        ));
    }
}
