//! # Taskboard Shared Library
//!
//! Types, persistence and business logic used by the Taskboard API server
//! and its client.
//!
//! ## Module Organization
//!
//! - `models`: users and tasks, with their wire formats
//! - `store`: persistence traits plus PostgreSQL and in-memory backends
//! - `db`: PostgreSQL pool and migrations
//! - `auth`: password hashing, tokens, bearer extraction, role policies
//! - `services`: the auth and task components

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
