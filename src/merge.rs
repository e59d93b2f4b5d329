use std::collections::HashSet;
use std::hash::Hash;

use crate::records::HasId;

pub fn merge_unique_by_id<T: HasId + Clone>(existing: &[T], incoming: &[T]) -> Vec<T> {
    merge_unique_by_key(existing, incoming, HasId::id)
}

pub fn merge_unique_by_key<T, K, F>(existing: &[T], incoming: &[T], key_fn: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = existing.iter().map(&key_fn).collect();
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    merged.extend_from_slice(existing);
    for item in incoming {
        if seen.insert(key_fn(item)) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::records::Workout;

    use super::{merge_unique_by_id, merge_unique_by_key};

    fn workout(id: i64) -> Workout {
        Workout {
            id,
            date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("test date must be valid"),
            description: format!("workout {id}"),
            duration_minutes: None,
            notes: None,
        }
    }

    fn ids(items: &[Workout]) -> Vec<i64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn keeps_existing_order_and_appends_new_items() {
        let existing = vec![workout(1), workout(2)];
        let incoming = vec![workout(2), workout(3)];
        let merged = merge_unique_by_id(&existing, &incoming);
        assert_eq!(ids(&merged), vec![1, 2, 3]);
    }

    #[test]
    fn does_not_mutate_inputs() {
        let existing = vec![workout(1)];
        let incoming = vec![workout(1), workout(2)];
        let _ = merge_unique_by_id(&existing, &incoming);
        assert_eq!(ids(&existing), vec![1]);
        assert_eq!(ids(&incoming), vec![1, 2]);
    }

    #[test]
    fn merging_twice_equals_merging_once() {
        let existing = vec![workout(1), workout(2)];
        let incoming = vec![workout(2), workout(3), workout(4)];
        let once = merge_unique_by_id(&existing, &incoming);
        let twice = merge_unique_by_id(&once, &incoming);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn dedupes_within_incoming_when_existing_is_empty() {
        let incoming = vec![workout(5), workout(5), workout(6)];
        let merged = merge_unique_by_id(&[], &incoming);
        assert_eq!(ids(&merged), vec![5, 6]);
    }

    #[test]
    fn empty_incoming_returns_a_copy() {
        let existing = vec![workout(1), workout(2)];
        let merged = merge_unique_by_id(&existing, &[]);
        assert_eq!(ids(&merged), ids(&existing));
        assert_ne!(merged.as_ptr(), existing.as_ptr());
    }

    #[test]
    fn handles_large_overlapping_collections() {
        let existing = (0..1000).map(workout).collect::<Vec<_>>();
        let incoming = (500..1500).map(workout).collect::<Vec<_>>();
        let merged = merge_unique_by_id(&existing, &incoming);
        assert_eq!(merged.len(), 1500);
        assert_eq!(merged[0].id, 0);
        assert_eq!(merged[999].id, 999);
        assert_eq!(merged[1000].id, 1000);
        assert_eq!(merged[1499].id, 1499);
    }

    #[test]
    fn composite_keys_disambiguate_repeated_ids() {
        let existing = vec![("workout", 1), ("pain", 1)];
        let incoming = vec![("sleep", 1), ("pain", 1)];
        let merged = merge_unique_by_key(&existing, &incoming, |item| (item.0, item.1));
        assert_eq!(
            merged,
            vec![("workout", 1), ("pain", 1), ("sleep", 1)]
        );
    }
}
