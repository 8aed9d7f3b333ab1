//! Schedule item model.
//!
//! # Responsibility
//! - Define the record stored in the shared schedule list.
//! - Answer per-item questions: does it apply on a date, who can see it,
//!   does it overlap a time window.
//!
//! # Invariants
//! - Classes are recurring and carry `day` + `semester`; events are one-off
//!   and carry `date`.
//! - `end_time` is strictly after `start_time`.
//! - Shared copies carry `is_shared = true`, `shared_by` and `original_id`.
//!
//! # See also
//! - `crate::schedule` for list-level filtering, dedup and comparison.

use crate::model::semester::Semester;
use crate::model::user::User;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ScheduleItemId = Uuid;

/// Kind of schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Weekly recurring class bounded by a semester.
    Class,
    /// One-off event on a single date.
    Event,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Event => "event",
        }
    }
}

/// Validation failures for schedule items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    BlankName,
    /// `end_time <= start_time`.
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },
    /// Class without weekday or semester, or not flagged recurring.
    IncompleteClass(ScheduleItemId),
    /// Event without a date, or flagged recurring.
    IncompleteEvent(ScheduleItemId),
    /// `is_shared` set without `shared_by`/`original_id` (or the reverse).
    InconsistentSharing(ScheduleItemId),
}

impl Display for ScheduleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "schedule item name must not be blank"),
            Self::InvalidTimeRange { start, end } => write!(
                f,
                "end time {} must be after start time {}",
                end.format("%H:%M"),
                start.format("%H:%M")
            ),
            Self::IncompleteClass(id) => {
                write!(f, "class {id} must be recurring with a weekday and semester")
            }
            Self::IncompleteEvent(id) => {
                write!(f, "event {id} must be one-off with a date")
            }
            Self::InconsistentSharing(id) => {
                write!(f, "schedule item {id} has inconsistent sharing fields")
            }
        }
    }
}

impl Error for ScheduleValidationError {}

/// One entry of the shared schedule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: ScheduleItemId,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Meaningful for recurring classes.
    #[serde(default)]
    pub day: Option<Weekday>,
    /// Meaningful for one-off events.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub creator: User,
    #[serde(default)]
    pub semester: Option<Semester>,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<ScheduleItemId>,
    pub created_at: DateTime<Utc>,
}

impl ScheduleItem {
    /// Creates a weekly class bounded by `semester`.
    pub fn class(
        creator: User,
        name: impl Into<String>,
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        semester: Semester,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ItemKind::Class,
            name: name.into(),
            start_time,
            end_time,
            day: Some(day),
            date: None,
            is_recurring: true,
            creator,
            semester: Some(semester),
            is_shared: false,
            shared_by: None,
            original_id: None,
            created_at,
        }
    }

    /// Creates a one-off event on `date`.
    pub fn event(
        creator: User,
        name: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ItemKind::Event,
            name: name.into(),
            start_time,
            end_time,
            day: Some(date.weekday()),
            date: Some(date),
            is_recurring: false,
            creator,
            semester: None,
            is_shared: false,
            shared_by: None,
            original_id: None,
            created_at,
        }
    }

    /// Validates kind-specific and sharing invariants.
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        if self.name.trim().is_empty() {
            return Err(ScheduleValidationError::BlankName);
        }
        if self.end_time <= self.start_time {
            return Err(ScheduleValidationError::InvalidTimeRange {
                start: self.start_time,
                end: self.end_time,
            });
        }
        match self.kind {
            ItemKind::Class => {
                if !self.is_recurring || self.day.is_none() || self.semester.is_none() {
                    return Err(ScheduleValidationError::IncompleteClass(self.id));
                }
            }
            ItemKind::Event => {
                if self.is_recurring || self.date.is_none() {
                    return Err(ScheduleValidationError::IncompleteEvent(self.id));
                }
            }
        }
        let has_share_fields = self.shared_by.is_some() && self.original_id.is_some();
        if self.is_shared != has_share_fields {
            return Err(ScheduleValidationError::InconsistentSharing(self.id));
        }
        Ok(())
    }

    /// Whether this item occurs on `date`.
    ///
    /// Recurring items match on weekday within their semester window;
    /// one-off items match their stored date exactly.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if self.is_recurring {
            let day_match = self.day == Some(date.weekday());
            let in_semester = self
                .semester
                .as_ref()
                .is_some_and(|semester| semester.contains(date));
            day_match && in_semester
        } else {
            self.date == Some(date)
        }
    }

    /// Whether `user` sees this item: own items plus anything shared.
    pub fn visible_to(&self, user: User) -> bool {
        self.creator == user || self.is_shared
    }

    /// Whether `[start_time, end_time)` intersects `[start, end)`.
    pub fn overlaps_window(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Whether both items can happen on the same day and their times overlap.
    pub fn conflicts_with(&self, other: &ScheduleItem) -> bool {
        if !self.overlaps_window(other.start_time, other.end_time) {
            return false;
        }
        match (self.is_recurring, other.is_recurring) {
            (false, false) => self.date == other.date,
            (true, true) => {
                self.day == other.day
                    && match (&self.semester, &other.semester) {
                        (Some(a), Some(b)) => a.start <= b.end && b.start <= a.end,
                        _ => false,
                    }
            }
            (true, false) => other.date.is_some_and(|date| self.applies_on(date)),
            (false, true) => self.date.is_some_and(|date| other.applies_on(date)),
        }
    }

    /// Builds the shared duplicate of this item.
    pub fn shared_copy(&self, sharer: User, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            is_shared: true,
            shared_by: Some(sharer),
            original_id: Some(self.id),
            created_at,
            ..self.clone()
        }
    }
}

/// `HH:MM` serde format for wall-clock times.
///
/// Deserialization also accepts `HH:MM:SS`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parses `HH:MM` or `HH:MM:SS`.
    pub fn parse(value: &str) -> Result<NaiveTime, String> {
        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| format!("invalid time `{trimmed}`; expected HH:MM"))
    }
}

#[cfg(test)]
mod tests {
    use super::{hhmm, ItemKind, ScheduleItem, ScheduleValidationError};
    use crate::model::semester::Semester;
    use crate::model::user::User;
    use chrono::{NaiveDate, NaiveTime, Utc, Weekday};

    fn t(value: &str) -> NaiveTime {
        hhmm::parse(value).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fall_class(day: Weekday) -> ScheduleItem {
        ScheduleItem::class(
            User::Maria,
            "Biology",
            day,
            t("09:00"),
            t("10:30"),
            Semester::parse("Fall 2025").unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn recurring_class_applies_on_matching_weekday_inside_semester() {
        let class = fall_class(Weekday::Mon);
        // 2025-09-01 is a Monday.
        assert!(class.applies_on(d(2025, 9, 1)));
        assert!(!class.applies_on(d(2025, 9, 2)));
        // Monday outside the Fall window.
        assert!(!class.applies_on(d(2025, 7, 28)));
        assert!(!class.applies_on(d(2026, 1, 5)));
    }

    #[test]
    fn event_applies_only_on_its_date() {
        let event = ScheduleItem::event(
            User::Reni,
            "Party",
            d(2025, 10, 31),
            t("20:00"),
            t("23:00"),
            Utc::now(),
        );
        assert!(event.applies_on(d(2025, 10, 31)));
        assert!(!event.applies_on(d(2025, 11, 7)));
    }

    #[test]
    fn validate_rejects_reversed_times() {
        let mut class = fall_class(Weekday::Tue);
        class.end_time = t("08:00");
        assert!(matches!(
            class.validate(),
            Err(ScheduleValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_class_without_semester() {
        let mut class = fall_class(Weekday::Tue);
        class.semester = None;
        assert!(matches!(
            class.validate(),
            Err(ScheduleValidationError::IncompleteClass(_))
        ));
    }

    #[test]
    fn shared_copy_keeps_creator_and_links_original() {
        let class = fall_class(Weekday::Wed);
        let copy = class.shared_copy(User::Maria, Utc::now());
        assert_ne!(copy.id, class.id);
        assert_eq!(copy.original_id, Some(class.id));
        assert_eq!(copy.creator, User::Maria);
        assert!(copy.is_shared);
        assert!(copy.visible_to(User::Luna));
        assert!(!class.visible_to(User::Luna));
        copy.validate().unwrap();
    }

    #[test]
    fn conflicts_need_same_day_and_overlapping_times() {
        let monday = fall_class(Weekday::Mon);
        let mut overlapping = fall_class(Weekday::Mon);
        overlapping.start_time = t("10:00");
        overlapping.end_time = t("11:00");
        assert!(monday.conflicts_with(&overlapping));

        let mut adjacent = fall_class(Weekday::Mon);
        adjacent.start_time = t("10:30");
        adjacent.end_time = t("11:30");
        assert!(!monday.conflicts_with(&adjacent));

        let event = ScheduleItem::event(
            User::Maria,
            "Lab",
            d(2025, 9, 8),
            t("09:30"),
            t("09:45"),
            Utc::now(),
        );
        assert!(monday.conflicts_with(&event));
        assert!(event.conflicts_with(&monday));
    }

    #[test]
    fn serializes_times_as_hhmm_and_kind_as_type() {
        let class = fall_class(Weekday::Fri);
        let json = serde_json::to_value(&class).unwrap();
        assert_eq!(json["type"], "class");
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["isRecurring"], true);
        assert!(json.get("sharedBy").is_none());
        assert_eq!(class.kind, ItemKind::Class);
    }
}
