//! Duplicate detection by composite key.

use crate::model::schedule::{ItemKind, ScheduleItem, ScheduleItemId};
use crate::model::semester::Semester;
use crate::model::user::User;
use chrono::{NaiveDate, NaiveTime, Weekday};
use std::collections::HashSet;

/// Fields that make two items "the same" entry on a calendar.
///
/// Excludes `id` and ownership, so a shared copy and its original collapse
/// to one entry. Semesters compare by name and date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    kind: ItemKind,
    name: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    day: Option<Weekday>,
    date: Option<NaiveDate>,
    semester: Option<Semester>,
}

impl DedupKey {
    pub fn of(item: &ScheduleItem) -> Self {
        Self {
            kind: item.kind,
            name: item.name.trim().to_lowercase(),
            start_time: item.start_time,
            end_time: item.end_time,
            // Events match on date alone.
            day: if item.is_recurring { item.day } else { None },
            date: if item.is_recurring { None } else { item.date },
            semester: item.semester.clone(),
        }
    }
}

/// Keeps the first item per `DedupKey`, preserving input order.
pub fn dedup_items<'a>(items: impl IntoIterator<Item = &'a ScheduleItem>) -> Vec<&'a ScheduleItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(DedupKey::of(item)))
        .collect()
}

/// Storage-level duplicates: same key, same owner and same sharing state.
///
/// Returns the ids of every later duplicate; the first occurrence is kept.
pub fn redundant_ids(items: &[ScheduleItem]) -> Vec<ScheduleItemId> {
    let mut seen: HashSet<(DedupKey, User, bool, Option<User>)> = HashSet::new();
    items
        .iter()
        .filter(|item| {
            !seen.insert((
                DedupKey::of(item),
                item.creator,
                item.is_shared,
                item.shared_by,
            ))
        })
        .map(|item| item.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{dedup_items, redundant_ids};
    use crate::model::schedule::{hhmm, ScheduleItem};
    use crate::model::semester::Semester;
    use crate::model::user::User;
    use chrono::{NaiveDate, Utc, Weekday};

    fn class(user: User, name: &str) -> ScheduleItem {
        ScheduleItem::class(
            user,
            name,
            Weekday::Tue,
            hhmm::parse("13:00").unwrap(),
            hhmm::parse("14:15").unwrap(),
            Semester::parse("Spring 2026").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn shared_copy_collapses_into_original() {
        let original = class(User::Maria, "Chemistry");
        let copy = original.shared_copy(User::Maria, Utc::now());
        let items = vec![original.clone(), copy];

        let kept = dedup_items(&items);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, original.id);
    }

    #[test]
    fn name_comparison_ignores_case_and_padding() {
        let a = class(User::Maria, "Chemistry");
        let b = class(User::Reni, "  chemistry ");
        let items = vec![a, b];
        assert_eq!(dedup_items(&items).len(), 1);
    }

    #[test]
    fn different_semesters_are_distinct() {
        let a = class(User::Maria, "Chemistry");
        let mut b = class(User::Maria, "Chemistry");
        b.semester = Some(Semester::parse("Fall 2026").unwrap());
        let items = vec![a, b];
        assert_eq!(dedup_items(&items).len(), 2);
    }

    #[test]
    fn same_semester_name_with_other_range_is_distinct() {
        let a = class(User::Maria, "Chemistry");
        let mut b = class(User::Maria, "Chemistry");
        b.semester = Some(
            Semester::new(
                "Spring 2026",
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
            )
            .unwrap(),
        );
        let items = vec![a, b];
        assert_eq!(dedup_items(&items).len(), 2);
    }

    #[test]
    fn redundant_ids_keeps_shared_copies_but_drops_double_adds() {
        let original = class(User::Luna, "Art");
        let double_add = class(User::Luna, "Art");
        let copy = original.shared_copy(User::Luna, Utc::now());
        let items = vec![original, double_add.clone(), copy];

        assert_eq!(redundant_ids(&items), vec![double_add.id]);
    }

    #[test]
    fn events_on_different_dates_are_distinct() {
        let t = |v| hhmm::parse(v).unwrap();
        let a = ScheduleItem::event(
            User::Maria,
            "Study",
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            t("10:00"),
            t("11:00"),
            Utc::now(),
        );
        let b = ScheduleItem::event(
            User::Maria,
            "Study",
            NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
            t("10:00"),
            t("11:00"),
            Utc::now(),
        );
        let items = vec![a, b];
        assert_eq!(dedup_items(&items).len(), 2);
    }
}
