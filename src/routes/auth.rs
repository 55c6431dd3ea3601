use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{AuthResponse, LoginUser, RegisterUser};
use crate::services::auth_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /api/auth/register
///
/// Creates an account and returns a bearer token alongside the new user.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterUser>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("POST /auth/register - username={}", input.username);
    let response = auth_service::register(&state.pool, &state.jwt, input).await?;
    Ok(Json(response))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginUser>,
) -> Result<Json<AuthResponse>, AppError> {
    info!("POST /auth/login - username={}", input.username);
    let response = auth_service::login(&state.pool, &state.jwt, input).await?;
    Ok(Json(response))
}
