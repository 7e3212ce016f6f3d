//! # Taskboard Client
//!
//! Client-side pieces of Taskboard:
//!
//! - `storage`: where the bearer token lives
//! - `navigation`: view routing with the stored-token guard
//! - `api`: typed HTTP client for the REST API

pub mod api;
pub mod navigation;
pub mod storage;

pub use api::{ApiClient, ClientError};
pub use navigation::{resolve, Navigation, View};
pub use storage::{MemoryTokenStorage, TokenStorage};
