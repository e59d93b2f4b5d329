use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::merge::merge_unique_by_id;
use crate::records::{PainScore, SleepScore, Workout};

#[derive(Debug, Clone)]
pub struct CalendarState {
    pub workouts: Vec<Workout>,
    pub pain_scores: Vec<PainScore>,
    pub sleep_scores: Vec<SleepScore>,
    pub loading: bool,
    pub error: Option<String>,
    pub current_month: NaiveDate,
    pub fetched_months: HashSet<String>,
}

impl CalendarState {
    pub fn new(current_month: NaiveDate) -> Self {
        Self {
            workouts: Vec::new(),
            pain_scores: Vec::new(),
            sleep_scores: Vec::new(),
            loading: false,
            error: None,
            current_month: first_day_of_month(current_month),
            fetched_months: HashSet::new(),
        }
    }

    pub fn has_fetched(&self, month_key: &str) -> bool {
        self.fetched_months.contains(month_key)
    }
}

#[derive(Debug, Clone)]
pub enum CalendarAction {
    SetLoading(bool),
    SetError(Option<String>),
    SetMonth(NaiveDate),
    AppendMonthData {
        month_key: String,
        workouts: Vec<Workout>,
        pain_scores: Vec<PainScore>,
        sleep_scores: Vec<SleepScore>,
    },
    MarkMonthFetched(String),
}

pub fn reduce(state: &CalendarState, action: CalendarAction) -> CalendarState {
    let mut next = state.clone();
    match action {
        CalendarAction::SetLoading(loading) => {
            next.loading = loading;
        }
        CalendarAction::SetError(error) => {
            next.error = error;
        }
        CalendarAction::SetMonth(day) => {
            next.current_month = first_day_of_month(day);
        }
        CalendarAction::AppendMonthData {
            month_key: _,
            workouts,
            pain_scores,
            sleep_scores,
        } => {
            next.workouts = merge_unique_by_id(&state.workouts, &workouts);
            next.pain_scores = merge_unique_by_id(&state.pain_scores, &pain_scores);
            next.sleep_scores = merge_unique_by_id(&state.sleep_scores, &sleep_scores);
        }
        CalendarAction::MarkMonthFetched(month_key) => {
            next.fetched_months.insert(month_key);
        }
    }
    next
}

pub fn month_key(day: NaiveDate) -> String {
    day.format("%Y-%m").to_string()
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(day.year(), day.month(), 1).expect("first day of month must be valid")
}

pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = first_day_of_month(day);
    let first_of_next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1).expect("next year date should be valid")
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
            .expect("next month date should be valid")
    };
    (first, first_of_next - Duration::days(1))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::records::Workout;

    use super::{CalendarAction, CalendarState, first_day_of_month, month_bounds, month_key, reduce};

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date must parse")
    }

    fn workout(id: i64, date: &str) -> Workout {
        Workout {
            id,
            date: day(date),
            description: format!("workout {id}"),
            duration_minutes: None,
            notes: None,
        }
    }

    fn append(workouts: Vec<Workout>, key: &str) -> CalendarAction {
        CalendarAction::AppendMonthData {
            month_key: key.to_string(),
            workouts,
            pain_scores: Vec::new(),
            sleep_scores: Vec::new(),
        }
    }

    #[test]
    fn overlapping_appends_accumulate_without_duplicates() {
        let state = CalendarState::new(day("2026-02-10"));
        let state = reduce(
            &state,
            append(
                vec![workout(1, "2026-02-01"), workout(2, "2026-02-02")],
                "2026-02",
            ),
        );
        let state = reduce(
            &state,
            append(
                vec![workout(2, "2026-02-02"), workout(3, "2026-02-03")],
                "2026-02",
            ),
        );

        let ids = state.workouts.iter().map(|w| w.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn append_does_not_mark_month_fetched() {
        let state = CalendarState::new(day("2026-02-10"));
        let state = reduce(&state, append(vec![workout(1, "2026-02-01")], "2026-02"));
        assert!(!state.has_fetched("2026-02"));
    }

    #[test]
    fn mark_month_fetched_is_idempotent() {
        let state = CalendarState::new(day("2026-02-10"));
        let state = reduce(&state, CalendarAction::MarkMonthFetched("2026-02".to_string()));
        let state = reduce(&state, CalendarAction::MarkMonthFetched("2026-02".to_string()));
        assert!(state.has_fetched("2026-02"));
        assert_eq!(state.fetched_months.len(), 1);
    }

    #[test]
    fn set_month_snaps_to_first_day() {
        let state = CalendarState::new(day("2026-02-10"));
        let state = reduce(&state, CalendarAction::SetMonth(day("2026-07-19")));
        assert_eq!(state.current_month, day("2026-07-01"));
    }

    #[test]
    fn loading_and_error_are_plain_replacements() {
        let state = CalendarState::new(day("2026-02-10"));
        let state = reduce(&state, CalendarAction::SetLoading(true));
        assert!(state.loading);
        let state = reduce(&state, CalendarAction::SetError(Some("fetch failed".to_string())));
        assert_eq!(state.error.as_deref(), Some("fetch failed"));
        let state = reduce(&state, CalendarAction::SetError(None));
        assert!(state.error.is_none());
    }

    #[test]
    fn reduce_leaves_previous_state_untouched() {
        let state = CalendarState::new(day("2026-02-10"));
        let next = reduce(&state, append(vec![workout(1, "2026-02-01")], "2026-02"));
        assert!(state.workouts.is_empty());
        assert_eq!(next.workouts.len(), 1);
    }

    #[test]
    fn month_key_zero_pads_the_month() {
        assert_eq!(month_key(day("2026-03-31")), "2026-03");
        assert_eq!(month_key(day("2026-11-01")), "2026-11");
    }

    #[test]
    fn month_bounds_are_inclusive_and_year_safe() {
        assert_eq!(
            month_bounds(day("2026-02-14")),
            (day("2026-02-01"), day("2026-02-28"))
        );
        assert_eq!(
            month_bounds(day("2026-12-25")),
            (day("2026-12-01"), day("2026-12-31"))
        );
        assert_eq!(first_day_of_month(day("2026-12-25")), day("2026-12-01"));
    }
}
