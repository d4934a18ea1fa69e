//! Day grouping and text filtering for the note list.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, TimeZone};

use crate::models::Note;

/// Bucket key: the calendar day a note was created on, in the viewer's zone.
///
/// Notes without a timestamp go to `Undated`, which orders before every day.
/// Its display form `(undated)` also sorts before every `yyyy-mm-dd` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateKey {
    Undated,
    Day(NaiveDate),
}

impl DateKey {
    /// Key for `note` when viewed from `tz`.
    #[must_use]
    pub fn for_note<Tz: TimeZone>(note: &Note, tz: &Tz) -> Self {
        note.created_at.map_or(Self::Undated, |created_at| {
            Self::Day(created_at.with_timezone(tz).date_naive())
        })
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undated => f.write_str("(undated)"),
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Notes bucketed by [`DateKey`], iterated in ascending key order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayGroups(BTreeMap<DateKey, Vec<Note>>);

impl DayGroups {
    pub fn iter(&self) -> btree_map::Iter<'_, DateKey, Vec<Note>> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &DateKey> {
        self.0.keys()
    }

    #[must_use]
    pub fn get(&self, key: &DateKey) -> Option<&Vec<Note>> {
        self.0.get(key)
    }

    /// Number of buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn note_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// All notes, bucket after bucket
    #[must_use]
    pub fn flatten(&self) -> Vec<&Note> {
        self.0.values().flatten().collect()
    }
}

impl<'a> IntoIterator for &'a DayGroups {
    type Item = (&'a DateKey, &'a Vec<Note>);
    type IntoIter = btree_map::Iter<'a, DateKey, Vec<Note>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sort notes by creation time and bucket them by calendar day in `tz`.
///
/// The sort is stable, so notes with equal or missing timestamps keep their
/// input order.
#[must_use]
pub fn group_by_day<Tz: TimeZone>(notes: &[Note], tz: &Tz) -> DayGroups {
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|note| note.created_at);

    let mut groups: BTreeMap<DateKey, Vec<Note>> = BTreeMap::new();
    for note in sorted {
        groups
            .entry(DateKey::for_note(&note, tz))
            .or_default()
            .push(note);
    }
    DayGroups(groups)
}

/// [`group_by_day`] in the host's local time zone
#[must_use]
pub fn group_by_local_day(notes: &[Note]) -> DayGroups {
    group_by_day(notes, &Local)
}

/// Keep notes whose content contains `query`, ignoring case.
///
/// Buckets left empty are dropped. An empty query keeps everything.
#[must_use]
pub fn filter_groups(groups: &DayGroups, query: &str) -> DayGroups {
    if query.is_empty() {
        return groups.clone();
    }

    let needle = query.to_lowercase();
    let filtered = groups
        .iter()
        .filter_map(|(key, notes)| {
            let matching = notes
                .iter()
                .filter(|note| note.content.to_lowercase().contains(&needle))
                .cloned()
                .collect::<Vec<_>>();
            (!matching.is_empty()).then_some((*key, matching))
        })
        .collect();
    DayGroups(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use pretty_assertions::assert_eq;

    fn note_at(content: &str, created_at: Option<&str>) -> Note {
        let mut note = Note::new(content);
        note.created_at = created_at.map(|at| at.parse::<DateTime<Utc>>().unwrap());
        note
    }

    fn day(value: &str) -> DateKey {
        DateKey::Day(value.parse().unwrap())
    }

    fn utc_plus(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn local_midnight_splits_same_utc_day() {
        let notes = vec![
            note_at("buy milk", Some("2024-01-01T10:00:00Z")),
            note_at("call mom", Some("2024-01-01T23:30:00Z")),
        ];

        let groups = group_by_day(&notes, &utc_plus(2));
        let keys = groups.keys().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(groups.get(&day("2024-01-01")).unwrap()[0].content, "buy milk");
        assert_eq!(groups.get(&day("2024-01-02")).unwrap()[0].content, "call mom");

        let utc_groups = group_by_day(&notes, &Utc);
        assert_eq!(utc_groups.len(), 1);
        assert_eq!(utc_groups.note_count(), 2);
    }

    #[test]
    fn flatten_is_stable_sort_by_created_at() {
        let notes = vec![
            note_at("c", Some("2024-03-02T08:00:00Z")),
            note_at("undated-1", None),
            note_at("a", Some("2024-03-01T08:00:00Z")),
            note_at("b-first", Some("2024-03-01T09:00:00Z")),
            note_at("undated-2", None),
            note_at("b-second", Some("2024-03-01T09:00:00Z")),
        ];

        let mut expected = notes.clone();
        expected.sort_by_key(|note| note.created_at);

        let groups = group_by_day(&notes, &utc_plus(-5));
        let flattened = groups.flatten().into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(flattened, expected);
        assert_eq!(
            flattened.iter().map(|n| n.content.as_str()).collect::<Vec<_>>(),
            vec!["undated-1", "undated-2", "a", "b-first", "b-second", "c"]
        );
    }

    #[test]
    fn undated_bucket_orders_first() {
        let notes = vec![
            note_at("dated", Some("2024-05-05T12:00:00Z")),
            note_at("draft", None),
        ];

        let groups = group_by_day(&notes, &Utc);
        let keys = groups.keys().copied().collect::<Vec<_>>();
        assert_eq!(keys, vec![DateKey::Undated, day("2024-05-05")]);
        assert_eq!(DateKey::Undated.to_string(), "(undated)");
    }

    #[test]
    fn display_order_matches_key_order_with_undated() {
        let notes = vec![
            note_at("dated", Some("2024-05-05T12:00:00Z")),
            note_at("older", Some("1999-01-01T12:00:00Z")),
            note_at("draft", None),
        ];

        let groups = group_by_day(&notes, &Utc);
        let keys = groups.keys().map(ToString::to_string).collect::<Vec<_>>();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], "(undated)");
    }

    #[test]
    fn key_for_note_uses_viewer_zone() {
        let note = note_at("call mom", Some("2024-01-01T23:30:00Z"));
        assert_eq!(DateKey::for_note(&note, &utc_plus(2)), day("2024-01-02"));
        assert_eq!(DateKey::for_note(&note, &Utc), day("2024-01-01"));
        assert_eq!(
            DateKey::for_note(&Note::new("draft"), &utc_plus(2)),
            DateKey::Undated
        );
    }

    #[test]
    fn keys_order_chronologically_and_lexicographically() {
        let notes = vec![
            note_at("late", Some("2024-12-31T12:00:00Z")),
            note_at("early", Some("2023-02-01T12:00:00Z")),
            note_at("mid", Some("2024-01-10T12:00:00Z")),
        ];

        let groups = group_by_day(&notes, &Utc);
        let keys = groups.keys().map(ToString::to_string).collect::<Vec<_>>();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys, vec!["2023-02-01", "2024-01-10", "2024-12-31"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups = group_by_day(&[], &Utc);
        assert!(groups.is_empty());
        assert_eq!(groups.note_count(), 0);
    }

    #[test]
    fn empty_query_is_identity() {
        let notes = vec![
            note_at("Milk", Some("2024-01-01T10:00:00Z")),
            note_at("Eggs", Some("2024-01-02T10:00:00Z")),
        ];
        let groups = group_by_day(&notes, &Utc);
        assert_eq!(filter_groups(&groups, ""), groups);
    }

    #[test]
    fn filter_is_case_insensitive_and_drops_empty_buckets() {
        let notes = vec![
            note_at("Buy MILK", Some("2024-01-01T10:00:00Z")),
            note_at("Eggs", Some("2024-01-01T11:00:00Z")),
            note_at("Call mom", Some("2024-01-02T10:00:00Z")),
            note_at("milkshake recipe", Some("2024-01-03T10:00:00Z")),
        ];
        let groups = group_by_day(&notes, &Utc);

        let filtered = filter_groups(&groups, "mIlK");
        let keys = filtered.keys().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-03"]);
        assert_eq!(filtered.note_count(), 2);
        for (_, bucket) in &filtered {
            for note in bucket {
                assert!(note.content.to_lowercase().contains("milk"));
            }
        }
    }

    #[test]
    fn filter_with_no_match_is_empty() {
        let notes = vec![note_at("Eggs", Some("2024-01-01T10:00:00Z"))];
        let groups = group_by_day(&notes, &Utc);
        assert!(filter_groups(&groups, "bread").is_empty());
    }

    #[test]
    fn filter_keeps_whitespace_in_query() {
        let notes = vec![
            note_at("buy milk", Some("2024-01-01T10:00:00Z")),
            note_at("buymilk", Some("2024-01-01T11:00:00Z")),
        ];
        let groups = group_by_day(&notes, &Utc);

        let filtered = filter_groups(&groups, "y m");
        assert_eq!(filtered.note_count(), 1);
        assert_eq!(filtered.flatten()[0].content, "buy milk");
    }
}
