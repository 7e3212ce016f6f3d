/// Data model shared by the server and the client
///
/// # Models
///
/// - `user`: user accounts and roles
/// - `task`: per-user tasks with a soft-delete flag

pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskChanges, TaskStatus};
pub use user::{NewUser, Role, User, UserProfile};
