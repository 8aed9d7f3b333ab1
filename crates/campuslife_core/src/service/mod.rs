//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod auth_service;
pub mod avatar_service;
pub mod budget_service;
pub mod home_service;
pub mod schedule_service;
pub mod task_service;
pub mod tutorial_service;
