//! Flutter-facing bridge over `campuslife_core`.

pub mod api;
