use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Application, ApplicationStatus, ApplicationWithJob, Job};

const APPLICATION_COLUMNS: &str =
    "a.id, a.job_id, a.applicant_id, ap.username AS applicant_username, a.status, \
     a.cover_letter, a.applied_at, j.title AS job_title, j.location AS job_location, \
     u.company AS job_company";

pub async fn create(
    pool: &PgPool,
    job_id: Uuid,
    applicant_id: Uuid,
    cover_letter: Option<String>,
) -> Result<Application, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        "INSERT INTO applications (id, job_id, applicant_id, cover_letter)
         VALUES ($1, $2, $3, $4)
         RETURNING id, job_id, applicant_id, status, cover_letter, applied_at",
    )
    .bind(Uuid::new_v4())
    .bind(job_id)
    .bind(applicant_id)
    .bind(cover_letter)
    .fetch_one(pool)
    .await
}

pub async fn exists(pool: &PgPool, job_id: Uuid, applicant_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND applicant_id = $2)",
    )
    .bind(job_id)
    .bind(applicant_id)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        "SELECT id, job_id, applicant_id, status, cover_letter, applied_at
         FROM applications
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_for_applicant(
    pool: &PgPool,
    applicant_id: Uuid,
) -> Result<Vec<ApplicationWithJob>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationWithJob>(&format!(
        "SELECT {APPLICATION_COLUMNS}
         FROM applications a
         JOIN users ap ON ap.id = a.applicant_id
         JOIN jobs j ON j.id = a.job_id
         JOIN users u ON u.id = j.created_by
         WHERE a.applicant_id = $1
         ORDER BY a.applied_at DESC"
    ))
    .bind(applicant_id)
    .fetch_all(pool)
    .await
}

pub async fn fetch_for_employer(
    pool: &PgPool,
    employer_id: Uuid,
) -> Result<Vec<ApplicationWithJob>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationWithJob>(&format!(
        "SELECT {APPLICATION_COLUMNS}
         FROM applications a
         JOIN users ap ON ap.id = a.applicant_id
         JOIN jobs j ON j.id = a.job_id
         JOIN users u ON u.id = j.created_by
         WHERE j.created_by = $1
         ORDER BY a.applied_at DESC"
    ))
    .bind(employer_id)
    .fetch_all(pool)
    .await
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        "UPDATE applications
         SET status = $2
         WHERE id = $1
         RETURNING id, job_id, applicant_id, status, cover_letter, applied_at",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
}

/// The jobs a user has applied to, one row per application, joined the same
/// way `job_queries` joins them. This is what the profile builder consumes.
pub async fn fetch_applied_jobs(pool: &PgPool, applicant_id: Uuid) -> Result<Vec<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        "SELECT j.id, j.title, j.description, j.requirements, j.location, j.salary,
                u.company AS company, j.created_by, j.is_active, j.created_at, j.updated_at
         FROM applications a
         JOIN jobs j ON j.id = a.job_id
         JOIN users u ON u.id = j.created_by
         WHERE a.applicant_id = $1
         ORDER BY a.applied_at ASC",
    )
    .bind(applicant_id)
    .fetch_all(pool)
    .await
}
