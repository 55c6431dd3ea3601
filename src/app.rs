use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{applications, auth, health, jobs, recommendations, users};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/jobs", jobs::router())
        .nest("/api/applications", applications::router())
        .nest("/api/users", users::router())
        .nest("/api/recommendations", recommendations::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
