//! Sport types and the statistic/event vocabularies each of them accepts.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Sport played during a match; selects the statistic and event vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    Football,
    Cricket,
    Basketball,
    Tennis,
    Badminton,
    Other,
}

/// Statistic kinds tracked per team. Which ones are legal depends on the sport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    /// Zero-sum percentage split between both teams.
    Possession,
    Shots,
    ShotsOnTarget,
    Corners,
    Fouls,
    YellowCards,
    RedCards,
    Overs,
    Wickets,
    Extras,
    Boundaries,
    Sixes,
    Rebounds,
    Assists,
    ThreePointers,
    FreeThrows,
    Aces,
    DoubleFaults,
    BreakPoints,
    Smashes,
    Faults,
}

/// Kind of a live update appended to the match feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Sport-agnostic entry, accepted for every sport.
    General,
    Goal,
    Card,
    Substitution,
    Wicket,
    Run,
    Quarter,
}

/// Allowed statistic and event kinds for a sport.
#[derive(Debug)]
pub struct Vocabulary {
    pub statistics: &'static [StatisticKind],
    pub events: &'static [EventKind],
}

impl Vocabulary {
    /// Whether `kind` may be populated in the statistics block.
    pub fn allows_statistic(&self, kind: StatisticKind) -> bool {
        self.statistics.contains(&kind)
    }

    /// Whether `kind` may be appended to the feed. [`EventKind::General`] always is.
    pub fn allows_event(&self, kind: EventKind) -> bool {
        kind == EventKind::General || self.events.contains(&kind)
    }
}

const FOOTBALL: Vocabulary = Vocabulary {
    statistics: &[
        StatisticKind::Possession,
        StatisticKind::Shots,
        StatisticKind::ShotsOnTarget,
        StatisticKind::Corners,
        StatisticKind::Fouls,
        StatisticKind::YellowCards,
        StatisticKind::RedCards,
    ],
    events: &[EventKind::Goal, EventKind::Card, EventKind::Substitution],
};

const CRICKET: Vocabulary = Vocabulary {
    statistics: &[
        StatisticKind::Overs,
        StatisticKind::Wickets,
        StatisticKind::Extras,
        StatisticKind::Boundaries,
        StatisticKind::Sixes,
    ],
    events: &[EventKind::Wicket, EventKind::Run],
};

const BASKETBALL: Vocabulary = Vocabulary {
    statistics: &[
        StatisticKind::Rebounds,
        StatisticKind::Assists,
        StatisticKind::Fouls,
        StatisticKind::ThreePointers,
        StatisticKind::FreeThrows,
    ],
    events: &[EventKind::Quarter],
};

const TENNIS: Vocabulary = Vocabulary {
    statistics: &[
        StatisticKind::Aces,
        StatisticKind::DoubleFaults,
        StatisticKind::BreakPoints,
    ],
    events: &[],
};

const BADMINTON: Vocabulary = Vocabulary {
    statistics: &[StatisticKind::Smashes, StatisticKind::Faults],
    events: &[],
};

const OTHER: Vocabulary = Vocabulary {
    statistics: &[],
    events: &[],
};

impl SportType {
    /// Vocabulary table lookup for this sport.
    pub fn vocabulary(self) -> &'static Vocabulary {
        match self {
            SportType::Football => &FOOTBALL,
            SportType::Cricket => &CRICKET,
            SportType::Basketball => &BASKETBALL,
            SportType::Tennis => &TENNIS,
            SportType::Badminton => &BADMINTON,
            SportType::Other => &OTHER,
        }
    }

    /// Wire name of the sport.
    pub fn as_str(self) -> &'static str {
        match self {
            SportType::Football => "football",
            SportType::Cricket => "cricket",
            SportType::Basketball => "basketball",
            SportType::Tennis => "tennis",
            SportType::Badminton => "badminton",
            SportType::Other => "other",
        }
    }
}

const SPORT_NAMES: &[(&str, SportType)] = &[
    ("football", SportType::Football),
    ("cricket", SportType::Cricket),
    ("basketball", SportType::Basketball),
    ("tennis", SportType::Tennis),
    ("badminton", SportType::Badminton),
    ("other", SportType::Other),
];

const STATISTIC_NAMES: &[(&str, StatisticKind)] = &[
    ("possession", StatisticKind::Possession),
    ("shots", StatisticKind::Shots),
    ("shots_on_target", StatisticKind::ShotsOnTarget),
    ("corners", StatisticKind::Corners),
    ("fouls", StatisticKind::Fouls),
    ("yellow_cards", StatisticKind::YellowCards),
    ("red_cards", StatisticKind::RedCards),
    ("overs", StatisticKind::Overs),
    ("wickets", StatisticKind::Wickets),
    ("extras", StatisticKind::Extras),
    ("boundaries", StatisticKind::Boundaries),
    ("sixes", StatisticKind::Sixes),
    ("rebounds", StatisticKind::Rebounds),
    ("assists", StatisticKind::Assists),
    ("three_pointers", StatisticKind::ThreePointers),
    ("free_throws", StatisticKind::FreeThrows),
    ("aces", StatisticKind::Aces),
    ("double_faults", StatisticKind::DoubleFaults),
    ("break_points", StatisticKind::BreakPoints),
    ("smashes", StatisticKind::Smashes),
    ("faults", StatisticKind::Faults),
];

const EVENT_NAMES: &[(&str, EventKind)] = &[
    ("general", EventKind::General),
    ("goal", EventKind::Goal),
    ("card", EventKind::Card),
    ("substitution", EventKind::Substitution),
    ("wicket", EventKind::Wicket),
    ("run", EventKind::Run),
    ("quarter", EventKind::Quarter),
];

/// Raised when a free-form name does not match any known tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {category} `{value}`")]
pub struct UnknownName {
    pub category: &'static str,
    pub value: String,
}

fn lookup<T: Copy>(
    table: &[(&str, T)],
    category: &'static str,
    raw: &str,
) -> Result<T, UnknownName> {
    let needle = raw.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, value)| *value)
        .ok_or_else(|| UnknownName {
            category,
            value: raw.to_owned(),
        })
}

fn name_of<T: Copy + PartialEq>(table: &[(&'static str, T)], value: T) -> &'static str {
    table
        .iter()
        .find(|(_, candidate)| *candidate == value)
        .map(|(name, _)| *name)
        .unwrap_or("unknown")
}

impl FromStr for SportType {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(SPORT_NAMES, "sport type", s)
    }
}

impl FromStr for StatisticKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(STATISTIC_NAMES, "statistic kind", s)
    }
}

impl FromStr for EventKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(EVENT_NAMES, "event kind", s)
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(name_of(STATISTIC_NAMES, *self))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(name_of(EVENT_NAMES, *self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_event_is_legal_for_every_sport() {
        for (_, sport) in SPORT_NAMES {
            assert!(sport.vocabulary().allows_event(EventKind::General));
        }
    }

    #[test]
    fn football_vocabulary() {
        let vocabulary = SportType::Football.vocabulary();
        assert!(vocabulary.allows_statistic(StatisticKind::Possession));
        assert!(vocabulary.allows_event(EventKind::Goal));
        assert!(!vocabulary.allows_statistic(StatisticKind::Overs));
        assert!(!vocabulary.allows_event(EventKind::Wicket));
    }

    #[test]
    fn cricket_rejects_football_kinds() {
        let vocabulary = SportType::Cricket.vocabulary();
        assert!(vocabulary.allows_event(EventKind::Wicket));
        assert!(vocabulary.allows_event(EventKind::Run));
        assert!(!vocabulary.allows_event(EventKind::Goal));
        assert!(!vocabulary.allows_statistic(StatisticKind::Possession));
    }

    #[test]
    fn other_sport_only_accepts_general_events() {
        let vocabulary = SportType::Other.vocabulary();
        assert!(vocabulary.statistics.is_empty());
        assert!(!vocabulary.allows_event(EventKind::Quarter));
    }

    #[test]
    fn parsing_is_case_insensitive_and_trimmed() {
        assert_eq!("  Football ".parse::<SportType>(), Ok(SportType::Football));
        assert_eq!(
            "SHOTS_ON_TARGET".parse::<StatisticKind>(),
            Ok(StatisticKind::ShotsOnTarget)
        );
        assert_eq!("goal".parse::<EventKind>(), Ok(EventKind::Goal));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "curling".parse::<SportType>().unwrap_err();
        assert_eq!(err.category, "sport type");
        assert_eq!(err.value, "curling");
        assert!("touchdown".parse::<EventKind>().is_err());
        assert!("".parse::<StatisticKind>().is_err());
    }

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(StatisticKind::ThreePointers.to_string(), "three_pointers");
        assert_eq!(EventKind::Substitution.to_string(), "substitution");
        assert_eq!(SportType::Badminton.to_string(), "badminton");
    }
}
