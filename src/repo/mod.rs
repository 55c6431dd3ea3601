mod job_repository;
mod pg;

pub use job_repository::{ApplicationRepository, JobRepository, RepositoryError};
pub use pg::{PgApplicationRepository, PgJobRepository};
