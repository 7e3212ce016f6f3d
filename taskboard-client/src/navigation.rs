/// Client-side route guard
///
/// Decides what to show for a path before any API call is made. Protected
/// views need a stored token; without one the user is sent to the login
/// view. This only avoids rendering views whose API calls would fail; the
/// server's bearer check is the real boundary.

use crate::storage::TokenStorage;

/// Client views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    Dashboard,
    CreateTask,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Register => "/register",
            View::Dashboard => "/dashboard",
            View::CreateTask => "/create-task",
        }
    }

    /// Whether entering the view needs a stored token
    pub fn requires_token(&self) -> bool {
        matches!(self, View::Dashboard | View::CreateTask)
    }

    fn from_path(path: &str) -> Option<Self> {
        match path {
            "/login" => Some(View::Login),
            "/register" => Some(View::Register),
            "/dashboard" => Some(View::Dashboard),
            "/create-task" => Some(View::CreateTask),
            _ => None,
        }
    }
}

/// Outcome of resolving a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(View),
    NotFound,
}

/// Strips query, fragment and trailing slashes
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Resolves `path` against the route table and the token guard
pub fn resolve(path: &str, storage: &dyn TokenStorage) -> Navigation {
    let path = normalize(path);

    if path == "/" {
        return Navigation::Redirect(View::Login);
    }

    match View::from_path(path) {
        Some(view) if view.requires_token() && !storage.has_token() => {
            tracing::debug!(path, "No stored token, redirecting to login");
            Navigation::Redirect(View::Login)
        }
        Some(view) => Navigation::Render(view),
        None => Navigation::NotFound,
    }
}
