use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{Application, ApplicationWithJob, CreateApplication, UpdateApplicationStatus};
use crate::services::application_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications))
        .route("/", post(create_application))
        .route("/:id", get(get_application))
        .route("/:id/status", put(update_status))
}

/// GET /api/applications
///
/// Developers get their own applications; employers get applications to
/// their postings.
pub async fn list_applications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ApplicationWithJob>>, AppError> {
    info!("GET /applications - user={}", user.id);
    let applications = application_service::list_for(&state.pool, user).await?;
    Ok(Json(applications))
}

/// POST /api/applications - developers only, one application per posting.
pub async fn create_application(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateApplication>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    info!("POST /applications - user={}, job={}", user.id, input.job_id);
    let application = application_service::apply(&state.pool, user, input)
        .await
        .map_err(|e| {
            error!("Failed to create application: {}", e);
            e
        })?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    info!("GET /applications/{} - user={}", id, user.id);
    let application = application_service::fetch_one(&state.pool, user, id).await?;
    Ok(Json(application))
}

/// PUT /api/applications/:id/status - job owner (or admin) moves an
/// application through applied/shortlisted/rejected/hired.
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateApplicationStatus>,
) -> Result<Json<Application>, AppError> {
    info!("PUT /applications/{}/status - user={}", id, user.id);
    let application =
        application_service::update_status(&state.pool, user, id, input.status).await?;
    Ok(Json(application))
}
