use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<User>, AppError> {
    info!("GET /users/me - user={}", user.id);
    let user = auth_service::current_user(&state.pool, user.id).await?;
    Ok(Json(user))
}
