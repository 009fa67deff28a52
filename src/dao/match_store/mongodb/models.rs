use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::{
    dao::models::{LiveEventEntity, MatchEntity, StatisticEntity, TeamEntity},
    state::{
        lifecycle::MatchStatus,
        sport::{EventKind, SportType},
    },
};

/// Match document layout: teams, statistics and the event log are embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    /// Hyphenated UUID string.
    #[serde(rename = "_id")]
    id: String,
    name: String,
    sport_type: SportType,
    status: MatchStatus,
    start_time: DateTime,
    end_time: DateTime,
    turf_id: String,
    #[serde(default)]
    turf_name: String,
    owner_id: String,
    customer_id: Option<String>,
    share_code: String,
    teams: Vec<TeamEntity>,
    #[serde(default)]
    statistics: Vec<StatisticEntity>,
    #[serde(default)]
    events: Vec<MongoEventDocument>,
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoEventDocument {
    sequence: i64,
    team_index: Option<i32>,
    kind: EventKind,
    player: Option<String>,
    description: String,
    #[serde(default)]
    time_label: String,
    recorded_at: DateTime,
}

impl From<LiveEventEntity> for MongoEventDocument {
    fn from(value: LiveEventEntity) -> Self {
        Self {
            sequence: value.sequence as i64,
            team_index: value.team_index.map(i32::from),
            kind: value.kind,
            player: value.player,
            description: value.description,
            time_label: value.time_label,
            recorded_at: DateTime::from_system_time(value.recorded_at),
        }
    }
}

impl From<MongoEventDocument> for LiveEventEntity {
    fn from(value: MongoEventDocument) -> Self {
        Self {
            sequence: value.sequence.max(0) as u64,
            team_index: value.team_index.map(|index| index.clamp(0, u8::MAX as i32) as u8),
            kind: value.kind,
            player: value.player,
            description: value.description,
            time_label: value.time_label,
            recorded_at: value.recorded_at.to_system_time(),
        }
    }
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            sport_type: value.sport_type,
            status: value.status,
            start_time: DateTime::from_system_time(value.start_time),
            end_time: DateTime::from_system_time(value.end_time),
            turf_id: value.turf_id,
            turf_name: value.turf_name,
            owner_id: value.owner_id,
            customer_id: value.customer_id,
            share_code: value.share_code,
            teams: value.teams,
            statistics: value.statistics,
            events: value.events.into_iter().map(Into::into).collect(),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|_| MongoDaoError::InvalidDocumentId { id: value.id.clone() })?;

        Ok(Self {
            id,
            name: value.name,
            sport_type: value.sport_type,
            status: value.status,
            start_time: value.start_time.to_system_time(),
            end_time: value.end_time.to_system_time(),
            turf_id: value.turf_id,
            turf_name: value.turf_name,
            owner_id: value.owner_id,
            customer_id: value.customer_id,
            share_code: value.share_code,
            teams: value.teams,
            statistics: value.statistics,
            events: value.events.into_iter().map(Into::into).collect(),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        })
    }
}

/// Convert one listed document, logging and dropping it when it does not convert.
pub fn decode_listed(document: MongoMatchDocument) -> Option<MatchEntity> {
    MatchEntity::try_from(document)
        .inspect_err(|err| warn!(error = %err, "skipping unreadable match document"))
        .ok()
}

/// Filter selecting one match document by id.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}
