//! Shared schedule list persistence.
//!
//! # Responsibility
//! - Store every user's schedule items in one append-ordered list.
//!
//! # Invariants
//! - Stored order is insertion order; callers append, never reorder.
//! - Reads skip items that violate `ScheduleItem::validate()` and log them;
//!   the next write of the list drops them for good.
//! - Writes reject invalid items.

use crate::model::schedule::ScheduleItem;
use crate::repo::kv_store::{KvStore, RepoError, RepoResult};
use log::warn;

/// Storage key for the shared schedule list.
pub const SCHEDULE_ITEMS_KEY: &str = "schedule_items";

/// Repository interface for the shared schedule list.
pub trait ScheduleRepository {
    fn load_items(&self) -> RepoResult<Vec<ScheduleItem>>;
    fn save_items(&self, items: &[ScheduleItem]) -> RepoResult<()>;
}

impl<S: KvStore> ScheduleRepository for S {
    fn load_items(&self) -> RepoResult<Vec<ScheduleItem>> {
        let items: Vec<ScheduleItem> = self.get_json(SCHEDULE_ITEMS_KEY)?.unwrap_or_default();
        Ok(items
            .into_iter()
            .filter(|item| match item.validate() {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        "event=schedule_load module=repo status=skipped item_id={} error={err}",
                        item.id
                    );
                    false
                }
            })
            .collect())
    }

    fn save_items(&self, items: &[ScheduleItem]) -> RepoResult<()> {
        for item in items {
            item.validate()
                .map_err(|err| RepoError::InvalidData(format!("schedule item {}: {err}", item.id)))?;
        }
        if items.is_empty() {
            return self.remove_item(SCHEDULE_ITEMS_KEY);
        }
        self.set_json(SCHEDULE_ITEMS_KEY, items)
    }
}
