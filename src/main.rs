use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use jobportal_backend::app;
use jobportal_backend::auth::JwtKeys;
use jobportal_backend::logging::{init_logging, LoggingConfig};
use jobportal_backend::repo::{PgApplicationRepository, PgJobRepository};
use jobportal_backend::services::recommendation_service::JobRecommender;
use jobportal_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let recommender = Arc::new(JobRecommender::new(
        Arc::new(PgJobRepository::new(pool.clone())),
        Arc::new(PgApplicationRepository::new(pool.clone())),
    ));

    let state = AppState {
        pool,
        recommender,
        jwt: JwtKeys::from_secret(jwt_secret.as_bytes()),
    };
    let app = app::create_app(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Jobportal backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
