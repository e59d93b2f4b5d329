use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PainScore {
    pub id: i64,
    pub date: NaiveDate,
    pub score: u8,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepScore {
    pub id: i64,
    pub date: NaiveDate,
    pub score: u8,
    pub notes: Option<String>,
}

impl Workout {
    pub fn short_description(&self) -> String {
        self.description
            .lines()
            .next()
            .unwrap_or("(no description)")
            .to_string()
    }
}

pub trait HasId {
    fn id(&self) -> i64;
}

impl HasId for Workout {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for PainScore {
    fn id(&self) -> i64 {
        self.id
    }
}

impl HasId for SleepScore {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Workout,
    PainScore,
    SleepScore,
}

impl RecordKind {
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Workout => "workout",
            RecordKind::PainScore => "pain score",
            RecordKind::SleepScore => "sleep score",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemporalRecord {
    Workout(Workout),
    PainScore(PainScore),
    SleepScore(SleepScore),
}

pub type RecordKey = (RecordKind, i64);

impl TemporalRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            TemporalRecord::Workout(_) => RecordKind::Workout,
            TemporalRecord::PainScore(_) => RecordKind::PainScore,
            TemporalRecord::SleepScore(_) => RecordKind::SleepScore,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            TemporalRecord::Workout(workout) => workout.id,
            TemporalRecord::PainScore(pain_score) => pain_score.id,
            TemporalRecord::SleepScore(sleep_score) => sleep_score.id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            TemporalRecord::Workout(workout) => workout.date,
            TemporalRecord::PainScore(pain_score) => pain_score.date,
            TemporalRecord::SleepScore(sleep_score) => sleep_score.date,
        }
    }

    pub fn key(&self) -> RecordKey {
        (self.kind(), self.id())
    }

    pub fn title(&self) -> String {
        match self {
            TemporalRecord::Workout(workout) => workout.short_description(),
            TemporalRecord::PainScore(pain_score) => format!("pain {}/10", pain_score.score),
            TemporalRecord::SleepScore(sleep_score) => format!("sleep {}/10", sleep_score.score),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalHeader {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
}

impl JournalHeader {
    pub fn new() -> Self {
        Self {
            schema_version: 1,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Journal {
    pub header: JournalHeader,
    pub records: Vec<TemporalRecord>,
}

impl Journal {
    pub fn new() -> Self {
        Self {
            header: JournalHeader::new(),
            records: Vec::new(),
        }
    }

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> {
        self.records.iter().filter_map(|record| match record {
            TemporalRecord::Workout(workout) => Some(workout),
            _ => None,
        })
    }

    pub fn pain_scores(&self) -> impl Iterator<Item = &PainScore> {
        self.records.iter().filter_map(|record| match record {
            TemporalRecord::PainScore(pain_score) => Some(pain_score),
            _ => None,
        })
    }

    pub fn sleep_scores(&self) -> impl Iterator<Item = &SleepScore> {
        self.records.iter().filter_map(|record| match record {
            TemporalRecord::SleepScore(sleep_score) => Some(sleep_score),
            _ => None,
        })
    }

    pub fn add_workout(
        &mut self,
        date: NaiveDate,
        description: String,
        duration_minutes: Option<u32>,
        notes: Option<String>,
    ) -> i64 {
        let id = self.next_id(RecordKind::Workout);
        self.records.push(TemporalRecord::Workout(Workout {
            id,
            date,
            description,
            duration_minutes,
            notes,
        }));
        id
    }

    pub fn add_pain_score(
        &mut self,
        date: NaiveDate,
        score: u8,
        notes: Option<String>,
    ) -> Result<i64, String> {
        validate_score(score)?;
        let id = self.next_id(RecordKind::PainScore);
        self.records.push(TemporalRecord::PainScore(PainScore {
            id,
            date,
            score,
            notes,
        }));
        Ok(id)
    }

    pub fn add_sleep_score(
        &mut self,
        date: NaiveDate,
        score: u8,
        notes: Option<String>,
    ) -> Result<i64, String> {
        validate_score(score)?;
        let id = self.next_id(RecordKind::SleepScore);
        self.records.push(TemporalRecord::SleepScore(SleepScore {
            id,
            date,
            score,
            notes,
        }));
        Ok(id)
    }

    pub fn delete_record(&mut self, kind: RecordKind, id: i64) -> Result<(), String> {
        let position = self
            .records
            .iter()
            .position(|record| record.kind() == kind && record.id() == id)
            .ok_or_else(|| format!("{} not found: {id}", kind.label()))?;
        self.records.remove(position);
        Ok(())
    }

    pub fn records_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&TemporalRecord> {
        self.records
            .iter()
            .filter(|record| record.date() >= start && record.date() <= end)
            .collect()
    }

    fn next_id(&self, kind: RecordKind) -> i64 {
        self.records
            .iter()
            .filter(|record| record.kind() == kind)
            .map(TemporalRecord::id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn validate_score(score: u8) -> Result<(), String> {
    if score > 10 {
        return Err(format!("score out of range: {score} (expected 0-10)"));
    }
    Ok(())
}

pub fn parse_record_date(input: &str) -> Result<NaiveDate, String> {
    let day_part = input
        .split_once('T')
        .or_else(|| input.split_once(' '))
        .map(|(day, _)| day)
        .unwrap_or(input);
    NaiveDate::parse_from_str(day_part.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{input}': {err}"))
}
