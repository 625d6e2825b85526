//! Data access layer for the application's persistent entities.
//!
//! Each repository owns the SQL for one table family and exposes typed
//! operations to the service layer.

pub mod session_repository;
pub mod user_repository;
