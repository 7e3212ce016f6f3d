/// User endpoints
///
/// - `GET /users/me` - Profile of the token subject
/// - `GET /users` - All users (role `admin` only; enforced by the router)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use taskboard_shared::{auth::middleware::AuthContext, models::UserProfile};

/// Profile of the caller
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<UserProfile>> {
    let profile = state.auth.profile(auth.user_id).await?;
    Ok(Json(profile))
}

/// Every registered user, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    let users = state.auth.list_users().await?;
    Ok(Json(users))
}
