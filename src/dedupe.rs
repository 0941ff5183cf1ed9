use std::collections::HashSet;

use crate::calendar::events::Scheduled;

/// Keeps the first of every item sharing a uid and start instant, then
/// orders the survivors by start. Ties keep their input order.
pub fn dedupe_and_sort<T: Scheduled>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut unique: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(occurrence_key(item)))
        .collect();

    // `sort_by_key` is stable.
    unique.sort_by_key(|item| item.start());
    unique
}

fn occurrence_key<T: Scheduled>(item: &T) -> (String, i64) {
    (item.uid().to_string(), item.start().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        uid: &'static str,
        start: DateTime<Utc>,
        tag: u8,
    }

    impl Scheduled for Item {
        fn uid(&self) -> &str {
            self.uid
        }

        fn start(&self) -> DateTime<Utc> {
            self.start
        }
    }

    fn item(uid: &'static str, hour: u32, tag: u8) -> Item {
        Item {
            uid,
            start: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            tag,
        }
    }

    #[test]
    fn collapses_duplicates_and_sorts() {
        let out = dedupe_and_sort(vec![item("A", 10, 0), item("A", 10, 1), item("B", 9, 2)]);
        assert_eq!(out, vec![item("B", 9, 2), item("A", 10, 0)]);
    }

    #[test]
    fn first_duplicate_wins() {
        let out = dedupe_and_sort(vec![item("A", 10, 7), item("A", 10, 3)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tag, 7);
    }

    #[test]
    fn same_uid_different_start_is_kept() {
        let out = dedupe_and_sort(vec![item("A", 11, 0), item("A", 10, 1)]);
        assert_eq!(out, vec![item("A", 10, 1), item("A", 11, 0)]);
    }

    #[test]
    fn equal_starts_keep_input_order() {
        let out = dedupe_and_sort(vec![item("A", 9, 0), item("B", 9, 1)]);
        assert_eq!(out, vec![item("A", 9, 0), item("B", 9, 1)]);

        let out = dedupe_and_sort(vec![item("B", 9, 1), item("A", 9, 0)]);
        assert_eq!(out, vec![item("B", 9, 1), item("A", 9, 0)]);
    }

    #[test]
    fn ties_survive_reordering_of_other_items() {
        let input = vec![
            item("Z", 12, 0),
            item("C", 9, 1),
            item("A", 9, 2),
            item("C", 9, 3),
            item("B", 9, 4),
            item("Y", 8, 5),
        ];
        let tags: Vec<u8> = dedupe_and_sort(input).iter().map(|i| i.tag).collect();
        assert_eq!(tags, vec![5, 1, 2, 4, 0]);
    }

    #[test]
    fn is_idempotent() {
        let input = vec![
            item("A", 10, 0),
            item("B", 9, 1),
            item("A", 10, 2),
            item("C", 9, 3),
            item("B", 11, 4),
        ];
        let once = dedupe_and_sort(input);
        let twice = dedupe_and_sort(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_is_empty() {
        assert!(dedupe_and_sort(Vec::<Item>::new()).is_empty());
    }
}
