//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite and JSON encoding details from service orchestration.
//!
//! # Invariants
//! - Typed repositories are blanket-implemented for every `KvStore`.
//! - Schedule writes enforce `ScheduleItem::validate()` before persistence.

pub mod budget_repo;
pub mod kv_store;
pub mod profile_repo;
pub mod schedule_repo;
pub mod task_repo;
