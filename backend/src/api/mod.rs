//! Central module for organizing the application's main API endpoints.
//!
//! This module acts as a top-level container for the API domains outside
//! of core authentication: shared response envelopes and user account
//! management.

pub mod common;
pub mod user;
