use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::Job;
use crate::repo::{ApplicationRepository, JobRepository, RepositoryError};

#[derive(Clone)]
pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn fetch_active_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(db::job_queries::fetch_active(&self.pool).await?)
    }

    async fn fetch_active_jobs_by_recency(
        &self,
        limit: usize,
    ) -> Result<Vec<Job>, RepositoryError> {
        Ok(db::job_queries::fetch_active_by_recency(&self.pool, limit as i64).await?)
    }
}

#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn fetch_applied_jobs(&self, applicant_id: Uuid) -> Result<Vec<Job>, RepositoryError> {
        Ok(db::application_queries::fetch_applied_jobs(&self.pool, applicant_id).await?)
    }
}
