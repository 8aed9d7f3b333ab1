//! Domain model for the companion app's records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the persisted JSON shape stable across releases.
//!
//! # Invariants
//! - Every persisted record carries a stable id where it can be addressed.
//! - Records serialize in camelCase to match the stored blob format.

pub mod avatar;
pub mod budget;
pub mod schedule;
pub mod semester;
pub mod task;
pub mod tutorial;
pub mod user;
