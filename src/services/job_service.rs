use bigdecimal::{BigDecimal, Zero};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db;
use crate::errors::AppError;
use crate::models::{CreateJob, Job, JobListParams, JobListResponse, UpdateJob, UserRole};

const DEFAULT_PAGE_SIZE: u32 = 9;
const MAX_PAGE_SIZE: u32 = 100;

pub async fn list(pool: &PgPool, params: JobListParams) -> Result<JobListResponse, AppError> {
    let total = db::job_queries::count_filtered(pool, &params).await? as u64;

    if params.all.unwrap_or(false) {
        let jobs = db::job_queries::fetch_filtered(pool, &params, None, 0).await?;
        return Ok(JobListResponse {
            jobs,
            total_jobs: total,
            total_pages: 1,
            current_page: 1,
            has_next: false,
            has_previous: false,
        });
    }

    let page_size = params
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let total_pages = (total.div_ceil(page_size as u64) as u32).max(1);
    // Out-of-range pages clamp to the last page rather than erroring.
    let page = params.page.unwrap_or(1).clamp(1, total_pages);
    let offset = (page - 1) as i64 * page_size as i64;

    let jobs = db::job_queries::fetch_filtered(pool, &params, Some(page_size as i64), offset).await?;

    Ok(JobListResponse {
        jobs,
        total_jobs: total,
        total_pages,
        current_page: page,
        has_next: page < total_pages,
        has_previous: page > 1,
    })
}

pub async fn create(pool: &PgPool, user: AuthUser, input: CreateJob) -> Result<Job, AppError> {
    if user.role != UserRole::Employer && user.role != UserRole::Admin {
        return Err(AppError::Forbidden("Only employers can post jobs".into()));
    }
    validate_job_fields(
        Some(input.title.as_str()),
        Some(input.description.as_str()),
        Some(input.requirements.as_str()),
        Some(input.location.as_str()),
        input.salary.as_ref(),
    )?;
    Ok(db::job_queries::create(pool, user.id, input).await?)
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Job, AppError> {
    let job = db::job_queries::fetch_one(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    // Deactivated postings are invisible on the read side.
    if !job.is_active {
        return Err(AppError::NotFound);
    }
    Ok(job)
}

pub async fn update(
    pool: &PgPool,
    user: AuthUser,
    id: Uuid,
    input: UpdateJob,
) -> Result<Job, AppError> {
    let existing = db::job_queries::fetch_one(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    require_owner_or_admin(&user, existing.created_by, "You can only edit your own jobs")?;
    validate_job_fields(
        input.title.as_deref(),
        input.description.as_deref(),
        input.requirements.as_deref(),
        input.location.as_deref(),
        input.salary.as_ref(),
    )?;

    db::job_queries::update(pool, id, input)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete(pool: &PgPool, user: AuthUser, id: Uuid) -> Result<(), AppError> {
    let existing = db::job_queries::fetch_one(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    require_owner_or_admin(&user, existing.created_by, "You can only delete your own jobs")?;

    match db::job_queries::soft_delete(pool, id).await? {
        0 => Err(AppError::NotFound),
        _ => Ok(()),
    }
}

fn require_owner_or_admin(user: &AuthUser, owner: Uuid, message: &str) -> Result<(), AppError> {
    if user.id != owner && user.role != UserRole::Admin {
        return Err(AppError::Forbidden(message.into()));
    }
    Ok(())
}

fn validate_job_fields(
    title: Option<&str>,
    description: Option<&str>,
    requirements: Option<&str>,
    location: Option<&str>,
    salary: Option<&BigDecimal>,
) -> Result<(), AppError> {
    for (name, value) in [
        ("Title", title),
        ("Description", description),
        ("Requirements", requirements),
        ("Location", location),
    ] {
        if let Some(v) = value {
            if v.trim().is_empty() {
                return Err(AppError::Validation(format!("{} cannot be empty", name)));
            }
        }
    }
    if let Some(salary) = salary {
        if salary < &BigDecimal::zero() {
            return Err(AppError::Validation("Salary cannot be negative".into()));
        }
    }
    Ok(())
}
