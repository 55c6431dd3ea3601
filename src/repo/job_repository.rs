use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Job;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Read-side access to job postings, as the recommendation engine sees them.
/// The engine never talks to the pool directly so tests can substitute
/// in-memory (or deliberately failing) implementations.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn fetch_active_jobs(&self) -> Result<Vec<Job>, RepositoryError>;

    /// Fallback source: the most recently created active postings.
    async fn fetch_active_jobs_by_recency(&self, limit: usize)
        -> Result<Vec<Job>, RepositoryError>;
}

/// Read-side access to a user's application history, each application joined
/// to the posting it targets.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn fetch_applied_jobs(&self, applicant_id: Uuid) -> Result<Vec<Job>, RepositoryError>;
}
