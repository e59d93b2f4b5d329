use crate::merge::merge_unique_by_key;
use crate::records::{RecordKind, TemporalRecord};

#[derive(Debug, Clone)]
pub struct ActivityFeedState {
    pub items: Vec<TemporalRecord>,
    pub offset: u32,
    pub total_count: usize,
    pub show_workouts: bool,
    pub show_pain_scores: bool,
    pub show_sleep_scores: bool,
    pub error: Option<String>,
    pub is_loading_more: bool,
    pub is_deleting: bool,
    pub add_menu_open: bool,
}

impl Default for ActivityFeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            total_count: 0,
            show_workouts: true,
            show_pain_scores: true,
            show_sleep_scores: true,
            error: None,
            is_loading_more: false,
            is_deleting: false,
            add_menu_open: false,
        }
    }
}

impl ActivityFeedState {
    pub fn visible_items(&self) -> Vec<&TemporalRecord> {
        self.items
            .iter()
            .filter(|item| self.is_kind_visible(item.kind()))
            .collect()
    }

    pub fn is_kind_visible(&self, kind: RecordKind) -> bool {
        match kind {
            RecordKind::Workout => self.show_workouts,
            RecordKind::PainScore => self.show_pain_scores,
            RecordKind::SleepScore => self.show_sleep_scores,
        }
    }

    pub fn has_more(&self) -> bool {
        self.items.len() < self.total_count
    }
}

#[derive(Debug, Clone)]
pub enum ActivityAction {
    LoadInitial {
        items: Vec<TemporalRecord>,
        total: usize,
    },
    AppendPage {
        items: Vec<TemporalRecord>,
        total: Option<usize>,
    },
    DeleteItem {
        kind: RecordKind,
        id: i64,
    },
    ToggleFilter(RecordKind),
    ShowAllFilters,
    SetLoadingMore(bool),
    SetDeleting(bool),
    SetError(Option<String>),
    ToggleAddMenu,
}

pub fn reduce(state: &ActivityFeedState, action: ActivityAction) -> ActivityFeedState {
    let mut next = state.clone();
    match action {
        ActivityAction::LoadInitial { items, total } => {
            next.items = merge_unique_by_key(&[], &items, TemporalRecord::key);
            next.offset = 0;
            next.total_count = total;
            next.is_loading_more = false;
            next.error = None;
        }
        ActivityAction::AppendPage { items, total } => {
            next.items = merge_unique_by_key(&state.items, &items, TemporalRecord::key);
            next.offset = state.offset + 1;
            if let Some(total) = total {
                next.total_count = total;
            }
            next.is_loading_more = false;
        }
        ActivityAction::DeleteItem { kind, id } => {
            next.items
                .retain(|item| !(item.kind() == kind && item.id() == id));
        }
        ActivityAction::ToggleFilter(kind) => match kind {
            RecordKind::Workout => next.show_workouts = !state.show_workouts,
            RecordKind::PainScore => next.show_pain_scores = !state.show_pain_scores,
            RecordKind::SleepScore => next.show_sleep_scores = !state.show_sleep_scores,
        },
        ActivityAction::ShowAllFilters => {
            next.show_workouts = true;
            next.show_pain_scores = true;
            next.show_sleep_scores = true;
        }
        ActivityAction::SetLoadingMore(loading) => {
            next.is_loading_more = loading;
        }
        ActivityAction::SetDeleting(deleting) => {
            next.is_deleting = deleting;
        }
        ActivityAction::SetError(error) => {
            next.error = error;
        }
        ActivityAction::ToggleAddMenu => {
            next.add_menu_open = !state.add_menu_open;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::records::{PainScore, RecordKind, TemporalRecord, Workout};

    use super::{ActivityAction, ActivityFeedState, reduce};

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date must parse")
    }

    fn workout_item(id: i64) -> TemporalRecord {
        TemporalRecord::Workout(Workout {
            id,
            date: day("2026-02-01"),
            description: format!("workout {id}"),
            duration_minutes: None,
            notes: None,
        })
    }

    fn pain_item(id: i64) -> TemporalRecord {
        TemporalRecord::PainScore(PainScore {
            id,
            date: day("2026-02-01"),
            score: 3,
            notes: None,
        })
    }

    fn keys(state: &ActivityFeedState) -> Vec<(RecordKind, i64)> {
        state.items.iter().map(TemporalRecord::key).collect()
    }

    #[test]
    fn initial_load_dedupes_and_resets_pagination() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::AppendPage {
                items: vec![workout_item(9)],
                total: None,
            },
        );
        let state = reduce(
            &state,
            ActivityAction::LoadInitial {
                items: vec![workout_item(1), workout_item(1), pain_item(2)],
                total: 2,
            },
        );

        assert_eq!(
            keys(&state),
            vec![(RecordKind::Workout, 1), (RecordKind::PainScore, 2)]
        );
        assert_eq!(state.offset, 0);
        assert_eq!(state.total_count, 2);
        assert!(state.error.is_none());
    }

    #[test]
    fn append_increments_offset_once_per_page() {
        let state = ActivityFeedState::default();
        let state = reduce(
            &state,
            ActivityAction::AppendPage {
                items: vec![workout_item(1), workout_item(2), workout_item(3)],
                total: Some(10),
            },
        );
        assert_eq!(state.offset, 1);
        let state = reduce(
            &state,
            ActivityAction::AppendPage {
                items: Vec::new(),
                total: None,
            },
        );
        assert_eq!(state.offset, 2);
        assert_eq!(state.total_count, 10);
        assert!(!state.is_loading_more);
    }

    #[test]
    fn same_numeric_id_across_kinds_does_not_collide() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::LoadInitial {
                items: vec![workout_item(1), pain_item(1)],
                total: 2,
            },
        );
        assert_eq!(state.items.len(), 2);
    }

    #[test]
    fn delete_removes_only_the_matching_item_and_keeps_total() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::LoadInitial {
                items: vec![workout_item(1), pain_item(1), workout_item(2)],
                total: 3,
            },
        );
        let state = reduce(
            &state,
            ActivityAction::DeleteItem {
                kind: RecordKind::Workout,
                id: 1,
            },
        );

        assert_eq!(
            keys(&state),
            vec![(RecordKind::PainScore, 1), (RecordKind::Workout, 2)]
        );
        assert_eq!(state.total_count, 3);
    }

    #[test]
    fn toggle_filter_flips_exactly_one_flag() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::ToggleFilter(RecordKind::Workout),
        );
        assert!(!state.show_workouts);
        assert!(state.show_pain_scores);
        assert!(state.show_sleep_scores);

        let state = reduce(&state, ActivityAction::ToggleFilter(RecordKind::Workout));
        assert!(state.show_workouts);
    }

    #[test]
    fn show_all_filters_always_yields_all_true() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::ToggleFilter(RecordKind::PainScore),
        );
        let state = reduce(&state, ActivityAction::ToggleFilter(RecordKind::SleepScore));
        let state = reduce(&state, ActivityAction::ShowAllFilters);
        assert!(state.show_workouts && state.show_pain_scores && state.show_sleep_scores);
    }

    #[test]
    fn filters_only_affect_visibility_not_storage() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::LoadInitial {
                items: vec![workout_item(1), pain_item(2)],
                total: 2,
            },
        );
        let state = reduce(&state, ActivityAction::ToggleFilter(RecordKind::Workout));
        assert_eq!(state.items.len(), 2);
        let visible = state.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].kind(), RecordKind::PainScore);
    }

    #[test]
    fn has_more_compares_stored_items_to_reported_total() {
        let state = reduce(
            &ActivityFeedState::default(),
            ActivityAction::LoadInitial {
                items: vec![workout_item(1)],
                total: 3,
            },
        );
        assert!(state.has_more());
        let state = reduce(
            &state,
            ActivityAction::AppendPage {
                items: vec![workout_item(2), workout_item(3)],
                total: None,
            },
        );
        assert!(!state.has_more());
    }
}
