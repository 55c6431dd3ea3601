use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::services::recommendation_service::JobRecommender;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub recommender: Arc<JobRecommender>,
    pub jwt: JwtKeys,
}
