//! Schedule planner use-cases over the shared item list.
//!
//! # Responsibility
//! - Create classes and events, reporting (not rejecting) time conflicts.
//! - Share, delete and reset items with ownership checks.
//! - Serve the day, calendar, upcoming and comparison views.
//!
//! # Invariants
//! - Only the creator may share an item; shared copies are never reshared.
//! - Deleting an original also deletes every shared copy of it.
//! - Every write is one load-modify-save of the whole list.

use crate::model::schedule::{ScheduleItem, ScheduleItemId, ScheduleValidationError};
use crate::model::semester::Semester;
use crate::model::user::User;
use crate::repo::kv_store::RepoError;
use crate::repo::schedule_repo::ScheduleRepository;
use crate::schedule::compare::{compare_schedules, CompareError, ComparisonGrid, ScheduleComparison};
use crate::schedule::conflict::find_conflicts;
use crate::schedule::day_filter::{self, DatedItem, MarkKind};
use crate::schedule::dedup::redundant_ids;
use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use log::{info, warn};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from schedule use-cases.
#[derive(Debug)]
pub enum ScheduleServiceError {
    Validation(ScheduleValidationError),
    ItemNotFound(ScheduleItemId),
    /// `user` does not own the item they tried to change.
    NotOwner {
        id: ScheduleItemId,
        user: User,
    },
    /// The item is itself a shared copy.
    CannotReshare(ScheduleItemId),
    Compare(CompareError),
    Repo(RepoError),
}

impl Display for ScheduleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "schedule item not found: {id}"),
            Self::NotOwner { id, user } => {
                write!(f, "{user} is not allowed to change schedule item {id}")
            }
            Self::CannotReshare(id) => {
                write!(f, "schedule item {id} is a shared copy and cannot be shared again")
            }
            Self::Compare(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ScheduleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Compare(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScheduleServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ScheduleValidationError> for ScheduleServiceError {
    fn from(value: ScheduleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CompareError> for ScheduleServiceError {
    fn from(value: CompareError) -> Self {
        Self::Compare(value)
    }
}

/// Input for a weekly class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    pub name: String,
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub semester: Semester,
}

/// Input for a one-off event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Result of adding an item: the stored item plus anything it overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedItem {
    pub item: ScheduleItem,
    pub conflicts: Vec<ScheduleItem>,
}

/// Schedule facade over repository implementations.
pub struct ScheduleService<R: ScheduleRepository> {
    repo: R,
    grid: ComparisonGrid,
}

impl<R: ScheduleRepository> ScheduleService<R> {
    /// Creates a service with the default comparison grid.
    pub fn new(repo: R) -> Self {
        Self::with_grid(repo, ComparisonGrid::default())
    }

    pub fn with_grid(repo: R, grid: ComparisonGrid) -> Self {
        Self { repo, grid }
    }

    pub fn grid(&self) -> &ComparisonGrid {
        &self.grid
    }

    pub fn add_class(&self, user: User, input: NewClass) -> Result<AddedItem, ScheduleServiceError> {
        let item = ScheduleItem::class(
            user,
            input.name.trim(),
            input.day,
            input.start_time,
            input.end_time,
            input.semester,
            Utc::now(),
        );
        self.append(item)
    }

    pub fn add_event(&self, user: User, input: NewEvent) -> Result<AddedItem, ScheduleServiceError> {
        let item = ScheduleItem::event(
            user,
            input.name.trim(),
            input.date,
            input.start_time,
            input.end_time,
            Utc::now(),
        );
        self.append(item)
    }

    fn append(&self, item: ScheduleItem) -> Result<AddedItem, ScheduleServiceError> {
        item.validate()?;
        let mut items = self.repo.load_items()?;
        let conflicts: Vec<ScheduleItem> = find_conflicts(&items, &item).into_iter().cloned().collect();
        items.push(item.clone());
        self.repo.save_items(&items)?;

        if conflicts.is_empty() {
            info!(
                "event=schedule_add module=schedule status=ok user={} kind={}",
                item.creator,
                item.kind.as_str()
            );
        } else {
            warn!(
                "event=schedule_add module=schedule status=ok user={} kind={} conflicts={}",
                item.creator,
                item.kind.as_str(),
                conflicts.len()
            );
        }
        Ok(AddedItem { item, conflicts })
    }

    /// Every item `user` can see, in stored order.
    pub fn visible_items(&self, user: User) -> Result<Vec<ScheduleItem>, ScheduleServiceError> {
        let items = self.repo.load_items()?;
        Ok(items.into_iter().filter(|item| item.visible_to(user)).collect())
    }

    pub fn items_for_day(
        &self,
        user: User,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleItem>, ScheduleServiceError> {
        let items = self.repo.load_items()?;
        Ok(day_filter::items_for_day(&items, user, date))
    }

    pub fn marked_dates(
        &self,
        user: User,
        from: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, MarkKind>, ScheduleServiceError> {
        let items = self.repo.load_items()?;
        Ok(day_filter::marked_dates(&items, user, from, days))
    }

    pub fn upcoming(&self, user: User, today: NaiveDate) -> Result<Vec<DatedItem>, ScheduleServiceError> {
        let items = self.repo.load_items()?;
        Ok(day_filter::upcoming(&items, user, today))
    }

    pub fn today_class_count(&self, user: User, today: NaiveDate) -> Result<usize, ScheduleServiceError> {
        let items = self.repo.load_items()?;
        Ok(day_filter::class_count(&items, user, today))
    }

    /// Publishes `id` to every user.
    ///
    /// Returns the existing copy when the item was already shared.
    pub fn share_item(&self, user: User, id: ScheduleItemId) -> Result<ScheduleItem, ScheduleServiceError> {
        let mut items = self.repo.load_items()?;
        let original = items
            .iter()
            .find(|item| item.id == id)
            .ok_or(ScheduleServiceError::ItemNotFound(id))?;
        if original.is_shared {
            return Err(ScheduleServiceError::CannotReshare(id));
        }
        if original.creator != user {
            return Err(ScheduleServiceError::NotOwner { id, user });
        }
        if let Some(existing) = items.iter().find(|item| item.original_id == Some(id)) {
            return Ok(existing.clone());
        }

        let copy = original.shared_copy(user, Utc::now());
        items.push(copy.clone());
        self.repo.save_items(&items)?;
        info!("event=schedule_share module=schedule status=ok user={user}");
        Ok(copy)
    }

    /// Deletes `id`, plus its shared copies when it is an original.
    ///
    /// Returns the number of removed items.
    pub fn delete_item(&self, user: User, id: ScheduleItemId) -> Result<usize, ScheduleServiceError> {
        let mut items = self.repo.load_items()?;
        let target = items
            .iter()
            .find(|item| item.id == id)
            .ok_or(ScheduleServiceError::ItemNotFound(id))?;
        let allowed = if target.is_shared {
            target.shared_by == Some(user) || target.creator == user
        } else {
            target.creator == user
        };
        if !allowed {
            return Err(ScheduleServiceError::NotOwner { id, user });
        }

        let before = items.len();
        items.retain(|item| item.id != id && item.original_id != Some(id));
        let removed = before - items.len();
        self.repo.save_items(&items)?;
        info!("event=schedule_delete module=schedule status=ok user={user} removed={removed}");
        Ok(removed)
    }

    /// Removes every item created or shared by `user`, including copies of
    /// their originals.
    pub fn reset_schedule(&self, user: User) -> Result<usize, ScheduleServiceError> {
        let mut items = self.repo.load_items()?;
        let owned: HashSet<ScheduleItemId> = items
            .iter()
            .filter(|item| item.creator == user || item.shared_by == Some(user))
            .map(|item| item.id)
            .collect();
        let before = items.len();
        items.retain(|item| {
            !owned.contains(&item.id) && !item.original_id.is_some_and(|origin| owned.contains(&origin))
        });
        let removed = before - items.len();
        self.repo.save_items(&items)?;
        info!("event=schedule_reset module=schedule status=ok user={user} removed={removed}");
        Ok(removed)
    }

    /// Drops stored duplicates, keeping the first occurrence of each.
    pub fn compact_duplicates(&self) -> Result<usize, ScheduleServiceError> {
        let mut items = self.repo.load_items()?;
        let redundant: HashSet<ScheduleItemId> = redundant_ids(&items).into_iter().collect();
        if redundant.is_empty() {
            return Ok(0);
        }
        items.retain(|item| !redundant.contains(&item.id));
        self.repo.save_items(&items)?;
        info!(
            "event=schedule_compact module=schedule status=ok removed={}",
            redundant.len()
        );
        Ok(redundant.len())
    }

    /// Free/busy grid of `users` on `date` using the configured grid.
    pub fn compare(
        &self,
        users: &[User],
        date: NaiveDate,
    ) -> Result<ScheduleComparison, ScheduleServiceError> {
        let items = self.repo.load_items()?;
        Ok(compare_schedules(&items, users, date, &self.grid)?)
    }
}
