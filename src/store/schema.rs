//! Exercise store document types

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Day identifiers
// ============================================================================

/// One of the seven canonical days. The only partition key for exercise data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Key used in the durable document
    pub fn key(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    /// Capitalized name shown to users
    pub fn label(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognized day name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day: {0}")]
pub struct UnknownDay(pub String);

impl FromStr for Day {
    type Err = UnknownDay;

    /// Accepts full names and three-letter abbreviations, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|day| day.key() == lower || (lower.len() == 3 && day.key().starts_with(&lower)))
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}

// ============================================================================
// Exercise records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Strength,
    Cardio,
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseKind::Strength => write!(f, "strength"),
            ExerciseKind::Cardio => write!(f, "cardio"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Reference to a photo or video held by the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub id: String,
}

impl MediaRef {
    pub fn photo(id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Photo,
            id: id.into(),
        }
    }

    pub fn video(id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            id: id.into(),
        }
    }
}

/// One exercise in a day's plan, with its logged history.
///
/// `sets_history` and `weight_history` only grow, one entry each per logged
/// set, so index `i` of both describes the same set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordDoc", into = "RecordDoc")]
pub struct ExerciseRecord {
    pub name: String,
    pub kind: ExerciseKind,
    pub media: Option<MediaRef>,
    pub sets_history: Vec<u32>,
    pub weight_history: Vec<f64>,
}

impl ExerciseRecord {
    pub fn new(name: impl Into<String>, kind: ExerciseKind, media: Option<MediaRef>) -> Self {
        Self {
            name: name.into(),
            kind,
            media,
            sets_history: Vec::new(),
            weight_history: Vec::new(),
        }
    }

    /// Append one logged set
    pub fn log_set(&mut self, reps: u32, weight: f64) {
        self.sets_history.push(reps);
        self.weight_history.push(weight);
    }

    /// Number of logged sets
    pub fn set_count(&self) -> usize {
        self.sets_history.len()
    }

    /// Weight of the most recent logged set
    pub fn last_weight(&self) -> Option<f64> {
        self.weight_history.last().copied()
    }
}

/// Wire shape of an exercise record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordDoc {
    name: String,
    kind: ExerciseKind,
    #[serde(default)]
    media_kind: Option<MediaKind>,
    #[serde(default)]
    media_id: Option<String>,
    #[serde(default)]
    sets_history: Vec<u32>,
    #[serde(default)]
    weight_history: Vec<f64>,
}

impl From<RecordDoc> for ExerciseRecord {
    fn from(doc: RecordDoc) -> Self {
        let media = match (doc.media_kind, doc.media_id) {
            (Some(kind), Some(id)) => Some(MediaRef { kind, id }),
            (None, None) => None,
            (kind, id) => {
                tracing::warn!(
                    exercise = %doc.name,
                    media_kind = ?kind,
                    media_id = ?id,
                    "Dropping incomplete media reference"
                );
                None
            }
        };
        Self {
            name: doc.name,
            kind: doc.kind,
            media,
            sets_history: doc.sets_history,
            weight_history: doc.weight_history,
        }
    }
}

impl From<ExerciseRecord> for RecordDoc {
    fn from(record: ExerciseRecord) -> Self {
        let (media_kind, media_id) = match record.media {
            Some(MediaRef { kind, id }) => (Some(kind), Some(id)),
            None => (None, None),
        };
        Self {
            name: record.name,
            kind: record.kind,
            media_kind,
            media_id,
            sets_history: record.sets_history,
            weight_history: record.weight_history,
        }
    }
}

// ============================================================================
// Week plan
// ============================================================================

/// All seven day logs. The key set is fixed by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeekPlan {
    days: [Vec<ExerciseRecord>; 7],
}

impl WeekPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, day: Day) -> &[ExerciseRecord] {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: Day) -> &mut Vec<ExerciseRecord> {
        &mut self.days[day.index()]
    }

    /// Days with their logs, Monday first
    pub fn iter(&self) -> impl Iterator<Item = (Day, &[ExerciseRecord])> {
        Day::ALL.into_iter().map(move |day| (day, self.day(day)))
    }

    /// No exercises on any day
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }
}

impl Serialize for WeekPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Day::ALL.len()))?;
        for (day, records) in self.iter() {
            map.serialize_entry(day.key(), records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeekPlan {
    /// Missing days load as empty lists; an unknown key rejects the document
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Vec<ExerciseRecord>>::deserialize(deserializer)?;
        let mut week = WeekPlan::new();
        for (key, records) in raw {
            let day = Day::ALL
                .into_iter()
                .find(|day| day.key() == key)
                .ok_or_else(|| <D::Error as serde::de::Error>::custom(format!("unknown day key: {key}")))?;
            *week.day_mut(day) = records;
        }
        Ok(week)
    }
}
