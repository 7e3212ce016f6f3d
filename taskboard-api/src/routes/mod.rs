/// API route handlers
///
/// Handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `tasks`: Owner-scoped task CRUD
/// - `users`: Profile and admin user listing

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
