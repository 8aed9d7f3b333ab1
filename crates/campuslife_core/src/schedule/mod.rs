//! Schedule reconciliation over the shared item list.
//!
//! # Responsibility
//! - Filter the items that apply to a calendar day for one user.
//! - Collapse duplicate items by composite key.
//! - Detect naive time conflicts and build multi-user free/busy grids.
//!
//! # Invariants
//! - Every function here is pure over the slice it receives; persistence
//!   lives in `crate::repo::schedule_repo`.

pub mod compare;
pub mod conflict;
pub mod day_filter;
pub mod dedup;
