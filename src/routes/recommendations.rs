use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{RecommendationsResponse, RecommendedJob, UserRole};
use crate::services::recommendation_service::DEFAULT_MAX_RESULTS;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_recommendations))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
}

/// GET /api/recommendations
///
/// Personalized job recommendations for the authenticated developer, ranked
/// by the similarity engine. The engine never errors out: when the ranking
/// pipeline fails it answers with the newest active postings and the
/// response is marked `fallback: true`.
pub async fn get_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    if user.role != UserRole::Developer {
        return Err(AppError::Forbidden(
            "Job recommendations are only available for developers".into(),
        ));
    }

    let limit = params.limit.unwrap_or(DEFAULT_MAX_RESULTS).clamp(1, 50);
    info!("GET /recommendations - user={}, limit={}", user.id, limit);

    let outcome = state.recommender.recommend(user.id, limit).await;
    let fallback = outcome.is_fallback();
    let recommendations: Vec<RecommendedJob> = outcome
        .jobs()
        .iter()
        .cloned()
        .map(|job| RecommendedJob {
            job,
            recommended: true,
        })
        .collect();

    info!(
        "Returning {} recommendations for user {} (fallback={})",
        recommendations.len(),
        user.id,
        fallback
    );

    Ok(Json(RecommendationsResponse {
        count: recommendations.len(),
        recommendations,
        fallback,
    }))
}
