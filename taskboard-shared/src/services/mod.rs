/// Application components
///
/// - [`auth`]: registration, login and user lookups
/// - [`tasks`]: owner-scoped task CRUD with soft delete

pub mod auth;
pub mod tasks;

pub use auth::{AuthService, AuthServiceError, LoginOutput, RegisterInput, RegisterOutput};
pub use tasks::{TaskService, TaskServiceError};
