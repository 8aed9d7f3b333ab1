//! Day-level filtering for calendar and dashboard views.
//!
//! # Invariants
//! - An item is returned for `(user, date)` only when it is visible to
//!   `user` (own or shared) AND applies on `date`.
//! - Results are deduplicated and ordered by start time, then name.

use crate::model::schedule::{ItemKind, ScheduleItem};
use crate::model::user::User;
use crate::schedule::dedup::dedup_items;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Calendar marker kind for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    /// Only recurring classes fall on the date.
    Class,
    /// At least one one-off event falls on the date.
    Event,
}

/// Item paired with the concrete date it occurs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedItem {
    pub date: NaiveDate,
    pub item: ScheduleItem,
}

/// Items visible to `user` that occur on `date`.
pub fn items_for_day(items: &[ScheduleItem], user: User, date: NaiveDate) -> Vec<ScheduleItem> {
    let applicable = items
        .iter()
        .filter(|item| item.visible_to(user) && item.applies_on(date));
    let mut day_items: Vec<ScheduleItem> = dedup_items(applicable).into_iter().cloned().collect();
    day_items.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.name.cmp(&b.name))
    });
    day_items
}

/// Calendar marks for `days` consecutive dates starting at `from`.
///
/// Dates without any applicable visible item are absent from the map.
pub fn marked_dates(
    items: &[ScheduleItem],
    user: User,
    from: NaiveDate,
    days: u32,
) -> BTreeMap<NaiveDate, MarkKind> {
    let visible: Vec<&ScheduleItem> = items.iter().filter(|item| item.visible_to(user)).collect();
    let mut marks = BTreeMap::new();
    for offset in 0..days {
        let Some(date) = from.checked_add_signed(Duration::days(i64::from(offset))) else {
            break;
        };
        let mut mark = None;
        for item in visible.iter().filter(|item| item.applies_on(date)) {
            match item.kind {
                ItemKind::Event => {
                    mark = Some(MarkKind::Event);
                    break;
                }
                ItemKind::Class => mark = Some(MarkKind::Class),
            }
        }
        if let Some(mark) = mark {
            marks.insert(date, mark);
        }
    }
    marks
}

/// Visible items occurring today or tomorrow, ordered by date then time.
pub fn upcoming(items: &[ScheduleItem], user: User, today: NaiveDate) -> Vec<DatedItem> {
    let mut dated = Vec::new();
    let dates = [Some(today), today.succ_opt()];
    for date in dates.into_iter().flatten() {
        dated.extend(
            items_for_day(items, user, date)
                .into_iter()
                .map(|item| DatedItem { date, item }),
        );
    }
    dated
}

/// Number of distinct classes `user` sees on `date`.
pub fn class_count(items: &[ScheduleItem], user: User, date: NaiveDate) -> usize {
    items_for_day(items, user, date)
        .iter()
        .filter(|item| item.kind == ItemKind::Class)
        .count()
}
