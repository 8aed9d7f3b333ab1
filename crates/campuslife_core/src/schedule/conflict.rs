//! Naive overlap detection between one user's items.

use crate::model::schedule::ScheduleItem;

/// Existing items of the candidate's creator that overlap it in time on at
/// least one shared occurrence day.
///
/// Shared copies are skipped so an item and its copy report once.
pub fn find_conflicts<'a>(existing: &'a [ScheduleItem], candidate: &ScheduleItem) -> Vec<&'a ScheduleItem> {
    existing
        .iter()
        .filter(|item| {
            item.id != candidate.id
                && !item.is_shared
                && item.creator == candidate.creator
                && item.conflicts_with(candidate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::find_conflicts;
    use crate::model::schedule::{hhmm, ScheduleItem};
    use crate::model::semester::Semester;
    use crate::model::user::User;
    use chrono::{Utc, Weekday};

    fn class(user: User, start: &str, end: &str) -> ScheduleItem {
        ScheduleItem::class(
            user,
            "Class",
            Weekday::Fri,
            hhmm::parse(start).unwrap(),
            hhmm::parse(end).unwrap(),
            Semester::parse("Fall 2025").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn reports_only_same_creator_overlaps() {
        let mine = class(User::Maria, "09:00", "10:00");
        let shared = mine.shared_copy(User::Maria, Utc::now());
        let other_user = class(User::Luna, "09:00", "10:00");
        let existing = vec![mine.clone(), shared, other_user];

        let candidate = class(User::Maria, "09:30", "11:00");
        let conflicts = find_conflicts(&existing, &candidate);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, mine.id);
    }
}
