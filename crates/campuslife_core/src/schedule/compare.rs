//! Multi-user "who's free when" comparison grid.
//!
//! # Responsibility
//! - Split a day into fixed-size slots between configurable hours.
//! - Mark each compared user busy in a slot when one of their own items
//!   overlaps it on the compared date.
//!
//! # Invariants
//! - Only items created by a user count toward that user's busy time;
//!   shared visibility does not make anyone else busy.
//! - Slots are half-open `[start, end)`; the last slot is clipped to the
//!   grid end.

use crate::model::schedule::ScheduleItem;
use crate::model::user::User;
use crate::schedule::dedup::dedup_items;
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MIN_SLOT_MINUTES: u32 = 5;
const MAX_SLOT_MINUTES: u32 = 240;

/// Grid bounds for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonGrid {
    /// First hour shown, `0..=23`.
    pub start_hour: u32,
    /// Hour the grid ends at, `start_hour < end_hour <= 24`.
    pub end_hour: u32,
    pub slot_minutes: u32,
}

impl Default for ComparisonGrid {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 22,
            slot_minutes: 60,
        }
    }
}

/// Invalid comparison input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    InvalidHours { start_hour: u32, end_hour: u32 },
    InvalidSlotMinutes(u32),
    NoUsers,
}

impl Display for CompareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHours {
                start_hour,
                end_hour,
            } => write!(
                f,
                "invalid grid hours {start_hour}..{end_hour}; expected start < end <= 24"
            ),
            Self::InvalidSlotMinutes(value) => write!(
                f,
                "invalid slot length {value}; expected {MIN_SLOT_MINUTES}..={MAX_SLOT_MINUTES} minutes"
            ),
            Self::NoUsers => write!(f, "at least one user is required to compare schedules"),
        }
    }
}

impl Error for CompareError {}

impl ComparisonGrid {
    pub fn validate(&self) -> Result<(), CompareError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(CompareError::InvalidHours {
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        if !(MIN_SLOT_MINUTES..=MAX_SLOT_MINUTES).contains(&self.slot_minutes) {
            return Err(CompareError::InvalidSlotMinutes(self.slot_minutes));
        }
        Ok(())
    }

    /// Slot bounds in minutes since midnight.
    fn slot_bounds(&self) -> Vec<(u32, u32)> {
        let grid_end = self.end_hour * 60;
        let mut bounds = Vec::new();
        let mut start = self.start_hour * 60;
        while start < grid_end {
            let end = (start + self.slot_minutes).min(grid_end);
            bounds.push((start, end));
            start = end;
        }
        bounds
    }
}

/// One row of the comparison grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonSlot {
    pub start: NaiveTime,
    /// `None` when the slot runs to midnight.
    pub end: Option<NaiveTime>,
    /// Busy users with the names of the items that occupy the slot.
    pub busy: BTreeMap<User, Vec<String>>,
    /// Compared users with nothing in the slot, in request order.
    pub free: Vec<User>,
}

impl ComparisonSlot {
    pub fn everyone_free(&self) -> bool {
        self.busy.is_empty()
    }
}

/// Free/busy grid for several users on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleComparison {
    pub date: NaiveDate,
    pub users: Vec<User>,
    pub slots: Vec<ComparisonSlot>,
}

impl ScheduleComparison {
    /// Maximal runs of consecutive slots where every user is free.
    pub fn common_free_windows(&self) -> Vec<(NaiveTime, Option<NaiveTime>)> {
        let mut windows: Vec<(NaiveTime, Option<NaiveTime>)> = Vec::new();
        let mut previous_free = false;
        for slot in &self.slots {
            if !slot.everyone_free() {
                previous_free = false;
                continue;
            }
            match windows.last_mut() {
                Some(window) if previous_free => window.1 = slot.end,
                _ => windows.push((slot.start, slot.end)),
            }
            previous_free = true;
        }
        windows
    }
}

/// Builds the free/busy grid of `users` on `date`.
///
/// Duplicate users in the request are compared once.
pub fn compare_schedules(
    items: &[ScheduleItem],
    users: &[User],
    date: NaiveDate,
    grid: &ComparisonGrid,
) -> Result<ScheduleComparison, CompareError> {
    grid.validate()?;
    let mut compared: Vec<User> = Vec::with_capacity(users.len());
    for user in users {
        if !compared.contains(user) {
            compared.push(*user);
        }
    }
    if compared.is_empty() {
        return Err(CompareError::NoUsers);
    }

    let per_user: Vec<(User, Vec<&ScheduleItem>)> = compared
        .iter()
        .map(|user| {
            let own = items
                .iter()
                .filter(|item| item.creator == *user && item.applies_on(date));
            (*user, dedup_items(own))
        })
        .collect();

    let slots = grid
        .slot_bounds()
        .into_iter()
        .filter_map(|(start_min, end_min)| {
            let start = minutes_to_time(start_min)?;
            let end = minutes_to_time(end_min);
            let mut busy = BTreeMap::new();
            let mut free = Vec::new();
            for (user, own) in &per_user {
                let names: Vec<String> = own
                    .iter()
                    .filter(|item| overlaps_slot(item, start, end))
                    .map(|item| item.name.clone())
                    .collect();
                if names.is_empty() {
                    free.push(*user);
                } else {
                    busy.insert(*user, names);
                }
            }
            Some(ComparisonSlot {
                start,
                end,
                busy,
                free,
            })
        })
        .collect();

    Ok(ScheduleComparison {
        date,
        users: compared,
        slots,
    })
}

fn overlaps_slot(item: &ScheduleItem, start: NaiveTime, end: Option<NaiveTime>) -> bool {
    match end {
        Some(end) => item.overlaps_window(start, end),
        None => item.end_time > start,
    }
}

fn minutes_to_time(minutes: u32) -> Option<NaiveTime> {
    if minutes >= 24 * 60 {
        return None;
    }
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}

#[cfg(test)]
mod tests {
    use super::{compare_schedules, CompareError, ComparisonGrid};
    use crate::model::schedule::{hhmm, ScheduleItem};
    use crate::model::semester::Semester;
    use crate::model::user::User;
    use chrono::{NaiveDate, Utc, Weekday};

    fn t(value: &str) -> chrono::NaiveTime {
        hhmm::parse(value).unwrap()
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()
    }

    fn class(user: User, name: &str, start: &str, end: &str) -> ScheduleItem {
        ScheduleItem::class(
            user,
            name,
            Weekday::Wed,
            t(start),
            t(end),
            Semester::parse("Fall 2025").unwrap(),
            Utc::now(),
        )
    }

    fn grid(start_hour: u32, end_hour: u32) -> ComparisonGrid {
        ComparisonGrid {
            start_hour,
            end_hour,
            slot_minutes: 60,
        }
    }

    #[test]
    fn marks_busy_users_per_slot() {
        let items = vec![
            class(User::Maria, "Biology", "09:00", "10:30"),
            class(User::Luna, "Art", "10:00", "11:00"),
        ];
        let comparison =
            compare_schedules(&items, &[User::Maria, User::Luna], wednesday(), &grid(8, 12))
                .unwrap();

        assert_eq!(comparison.slots.len(), 4);
        let eight = &comparison.slots[0];
        assert!(eight.everyone_free());

        let nine = &comparison.slots[1];
        assert_eq!(nine.busy.get(&User::Maria).unwrap(), &vec!["Biology".to_string()]);
        assert_eq!(nine.free, vec![User::Luna]);

        let ten = &comparison.slots[2];
        assert_eq!(ten.busy.len(), 2);
        assert!(ten.free.is_empty());

        let eleven = &comparison.slots[3];
        assert!(eleven.everyone_free());
    }

    #[test]
    fn shared_copies_do_not_make_other_users_busy() {
        let original = class(User::Maria, "Biology", "09:00", "10:00");
        let copy = original.shared_copy(User::Maria, Utc::now());
        let items = vec![original, copy];

        let comparison =
            compare_schedules(&items, &[User::Maria, User::Reni], wednesday(), &grid(9, 10))
                .unwrap();
        let slot = &comparison.slots[0];
        assert_eq!(slot.busy.get(&User::Maria).map(Vec::len), Some(1));
        assert_eq!(slot.free, vec![User::Reni]);
    }

    #[test]
    fn common_free_windows_merge_adjacent_slots() {
        let items = vec![class(User::Maria, "Biology", "10:00", "11:00")];
        let comparison =
            compare_schedules(&items, &[User::Maria], wednesday(), &grid(8, 13)).unwrap();
        let windows = comparison.common_free_windows();
        assert_eq!(
            windows,
            vec![(t("08:00"), Some(t("10:00"))), (t("11:00"), Some(t("13:00")))]
        );
    }

    #[test]
    fn grid_running_to_midnight_has_open_last_slot() {
        let items = vec![class(User::Sheila, "Night lab", "23:15", "23:45")];
        let comparison =
            compare_schedules(&items, &[User::Sheila], wednesday(), &grid(22, 24)).unwrap();
        assert_eq!(comparison.slots.len(), 2);
        assert_eq!(comparison.slots[1].end, None);
        assert!(comparison.slots[1].busy.contains_key(&User::Sheila));
    }

    #[test]
    fn rejects_bad_grid_and_empty_users() {
        assert_eq!(
            compare_schedules(&[], &[User::Maria], wednesday(), &grid(12, 12)),
            Err(CompareError::InvalidHours {
                start_hour: 12,
                end_hour: 12
            })
        );
        assert_eq!(
            compare_schedules(&[], &[], wednesday(), &ComparisonGrid::default()),
            Err(CompareError::NoUsers)
        );
        let bad_slot = ComparisonGrid {
            slot_minutes: 1,
            ..ComparisonGrid::default()
        };
        assert_eq!(
            compare_schedules(&[], &[User::Maria], wednesday(), &bad_slot),
            Err(CompareError::InvalidSlotMinutes(1))
        );
    }
}
