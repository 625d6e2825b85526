//! Authentication module for managing user sessions and access control.
//!
//! This module provides the public interface for authentication-related
//! functionality: login, registration, token rotation, logout, and the
//! authorization middleware.

pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
