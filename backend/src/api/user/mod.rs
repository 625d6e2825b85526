//! Module for user account management API endpoints.
//!
//! This module handles mutations of account data owned by the auth core,
//! such as renaming a user or toggling the blocked flag.

pub mod handlers;
pub mod routes;
