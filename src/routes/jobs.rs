use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{CreateJob, Job, JobListParams, JobListResponse, UpdateJob};
use crate::services::job_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs))
        .route("/", post(create_job))
        .route("/:id", get(get_job))
        .route("/:id", put(update_job))
        .route("/:id", delete(delete_job))
}

/// GET /api/jobs
///
/// Public listing of active postings. Supports `search` (title, description,
/// requirements, company), `location`, `min_salary`/`max_salary`, `sort`
/// (newest | oldest | salary-high | salary-low | company), `page`/`page_size`
/// pagination, and `all=true` to skip pagination entirely.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<Json<JobListResponse>, AppError> {
    info!(
        "GET /jobs - search={:?}, location={:?}, sort={:?}, page={:?}",
        params.search, params.location, params.sort, params.page
    );
    let response = job_service::list(&state.pool, params).await.map_err(|e| {
        error!("Failed to list jobs: {}", e);
        e
    })?;
    Ok(Json(response))
}

/// POST /api/jobs - employers and admins only.
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    info!("POST /jobs - user={}, title={}", user.id, input.title);
    let job = job_service::create(&state.pool, user, input).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    info!("GET /jobs/{}", id);
    let job = job_service::fetch_one(&state.pool, id).await?;
    Ok(Json(job))
}

/// PUT /api/jobs/:id - partial update, owner or admin only.
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJob>,
) -> Result<Json<Job>, AppError> {
    info!("PUT /jobs/{} - user={}", id, user.id);
    let job = job_service::update(&state.pool, user, id, input)
        .await
        .map_err(|e| {
            error!("Failed to update job {}: {}", id, e);
            e
        })?;
    Ok(Json(job))
}

/// DELETE /api/jobs/:id - soft delete, owner or admin only.
pub async fn delete_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /jobs/{} - user={}", id, user.id);
    job_service::delete(&state.pool, user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
