use std::cmp::Reverse;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::records::{Journal, PainScore, RecordKind, SleepScore, TemporalRecord, Workout};
use crate::storage::{StorageError, load_journal, save_journal};

pub const ACTIVITY_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct MonthRangeData {
    pub workouts: Vec<Workout>,
    pub pain_scores: Vec<PainScore>,
    pub sleep_scores: Vec<SleepScore>,
}

#[derive(Debug, Clone)]
pub struct ActivityPage {
    pub items: Vec<TemporalRecord>,
    pub total: usize,
    pub month_label: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Storage(StorageError),
    Domain(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Storage(err) => write!(f, "{err}"),
            ApiError::Domain(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err)
    }
}

impl From<String> for ApiError {
    fn from(message: String) -> Self {
        ApiError::Domain(message)
    }
}

pub trait FitnessApi {
    fn fetch_month_range(&self, start: NaiveDate, end: NaiveDate)
    -> Result<MonthRangeData, ApiError>;

    fn fetch_activity_page(&self, offset: u32) -> Result<ActivityPage, ApiError>;

    fn add_workout(
        &mut self,
        date: NaiveDate,
        description: String,
        duration_minutes: Option<u32>,
        notes: Option<String>,
    ) -> Result<i64, ApiError>;

    fn add_pain_score(
        &mut self,
        date: NaiveDate,
        score: u8,
        notes: Option<String>,
    ) -> Result<i64, ApiError>;

    fn add_sleep_score(
        &mut self,
        date: NaiveDate,
        score: u8,
        notes: Option<String>,
    ) -> Result<i64, ApiError>;

    fn delete_workout(&mut self, id: i64) -> Result<(), ApiError>;

    fn delete_pain_score(&mut self, id: i64) -> Result<(), ApiError>;

    fn delete_sleep_score(&mut self, id: i64) -> Result<(), ApiError>;
}

pub struct LocalJournal {
    path: PathBuf,
    journal: Journal,
}

impl LocalJournal {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let journal = load_journal(&path)?;
        Ok(Self { path, journal })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    fn persist(&self) -> Result<(), ApiError> {
        save_journal(&self.path, &self.journal)?;
        Ok(())
    }

    fn sorted_feed(&self) -> Vec<TemporalRecord> {
        let mut feed = self.journal.records.clone();
        feed.sort_by_key(|record| (Reverse(record.date()), Reverse(record.id())));
        feed
    }
}

impl FitnessApi for LocalJournal {
    fn fetch_month_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthRangeData, ApiError> {
        let mut data = MonthRangeData::default();
        for record in self.journal.records_in_range(start, end) {
            match record {
                TemporalRecord::Workout(workout) => data.workouts.push(workout.clone()),
                TemporalRecord::PainScore(pain_score) => data.pain_scores.push(pain_score.clone()),
                TemporalRecord::SleepScore(sleep_score) => {
                    data.sleep_scores.push(sleep_score.clone());
                }
            }
        }
        Ok(data)
    }

    fn fetch_activity_page(&self, offset: u32) -> Result<ActivityPage, ApiError> {
        let feed = self.sorted_feed();
        let total = feed.len();
        let items = feed
            .into_iter()
            .skip(offset as usize * ACTIVITY_PAGE_SIZE)
            .take(ACTIVITY_PAGE_SIZE)
            .collect::<Vec<_>>();
        let month_label = items
            .first()
            .map(|item| item.date().format("%B %Y").to_string());
        Ok(ActivityPage {
            items,
            total,
            month_label,
        })
    }

    fn add_workout(
        &mut self,
        date: NaiveDate,
        description: String,
        duration_minutes: Option<u32>,
        notes: Option<String>,
    ) -> Result<i64, ApiError> {
        let id = self
            .journal
            .add_workout(date, description, duration_minutes, notes);
        self.persist()?;
        Ok(id)
    }

    fn add_pain_score(
        &mut self,
        date: NaiveDate,
        score: u8,
        notes: Option<String>,
    ) -> Result<i64, ApiError> {
        let id = self.journal.add_pain_score(date, score, notes)?;
        self.persist()?;
        Ok(id)
    }

    fn add_sleep_score(
        &mut self,
        date: NaiveDate,
        score: u8,
        notes: Option<String>,
    ) -> Result<i64, ApiError> {
        let id = self.journal.add_sleep_score(date, score, notes)?;
        self.persist()?;
        Ok(id)
    }

    fn delete_workout(&mut self, id: i64) -> Result<(), ApiError> {
        self.journal.delete_record(RecordKind::Workout, id)?;
        self.persist()
    }

    fn delete_pain_score(&mut self, id: i64) -> Result<(), ApiError> {
        self.journal.delete_record(RecordKind::PainScore, id)?;
        self.persist()
    }

    fn delete_sleep_score(&mut self, id: i64) -> Result<(), ApiError> {
        self.journal.delete_record(RecordKind::SleepScore, id)?;
        self.persist()
    }
}
