use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db;
use crate::errors::AppError;
use crate::models::{
    Application, ApplicationStatus, ApplicationWithJob, CreateApplication, UserRole,
};

pub async fn apply(
    pool: &PgPool,
    user: AuthUser,
    input: CreateApplication,
) -> Result<Application, AppError> {
    if user.role != UserRole::Developer {
        return Err(AppError::Forbidden(
            "Only developers can apply for jobs".into(),
        ));
    }

    let job = db::job_queries::fetch_one(pool, input.job_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !job.is_active {
        return Err(AppError::Validation(
            "This job is no longer accepting applications".into(),
        ));
    }

    if db::application_queries::exists(pool, job.id, user.id).await? {
        return Err(AppError::Conflict(
            "You have already applied for this job".into(),
        ));
    }

    let application =
        db::application_queries::create(pool, job.id, user.id, input.cover_letter).await?;
    info!("User {} applied to job {}", user.id, job.id);
    Ok(application)
}

/// Employers see applications to their postings; developers see their own.
pub async fn list_for(pool: &PgPool, user: AuthUser) -> Result<Vec<ApplicationWithJob>, AppError> {
    let applications = match user.role {
        UserRole::Employer => db::application_queries::fetch_for_employer(pool, user.id).await?,
        _ => db::application_queries::fetch_for_applicant(pool, user.id).await?,
    };
    Ok(applications)
}

pub async fn fetch_one(pool: &PgPool, user: AuthUser, id: Uuid) -> Result<Application, AppError> {
    let application = db::application_queries::fetch_one(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if application.applicant_id != user.id && user.role != UserRole::Admin {
        let job = db::job_queries::fetch_one(pool, application.job_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if job.created_by != user.id {
            return Err(AppError::Forbidden(
                "You can only view your own applications or applications for your jobs".into(),
            ));
        }
    }
    Ok(application)
}

pub async fn update_status(
    pool: &PgPool,
    user: AuthUser,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, AppError> {
    let application = db::application_queries::fetch_one(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if user.role != UserRole::Admin {
        let job = db::job_queries::fetch_one(pool, application.job_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if job.created_by != user.id {
            return Err(AppError::Forbidden(
                "Only job owners can update application status".into(),
            ));
        }
    }

    db::application_queries::update_status(pool, id, status)
        .await?
        .ok_or(AppError::NotFound)
}
