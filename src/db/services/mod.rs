//! Data access for the dashboard tables.
//!
//! Each sub-module owns the queries for one entity. Functions take a
//! `&DatabaseConnection` and return `sea_orm::DbErr`; mapping those errors to
//! HTTP responses is left to the web layer.

pub mod channel_service;
pub mod giveaway_service;
pub mod token_service;
pub mod user_service;

pub use channel_service::*;
pub use giveaway_service::*;
pub use token_service::*;
pub use user_service::*;

use sea_orm::{DbErr, SqlErr};

/// True when the database rejected a write because of a unique constraint.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
