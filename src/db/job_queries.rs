use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{CreateJob, Job, JobListParams, UpdateJob};

const JOB_COLUMNS: &str = "j.id, j.title, j.description, j.requirements, j.location, j.salary, \
     u.company AS company, j.created_by, j.is_active, j.created_at, j.updated_at";

pub async fn create(pool: &PgPool, created_by: Uuid, input: CreateJob) -> Result<Job, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        "WITH inserted AS (
             INSERT INTO jobs (id, title, description, requirements, location, salary, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *
         )
         SELECT j.id, j.title, j.description, j.requirements, j.location, j.salary,
                u.company AS company, j.created_by, j.is_active, j.created_at, j.updated_at
         FROM inserted j
         JOIN users u ON u.id = j.created_by",
    )
    .bind(Uuid::new_v4())
    .bind(input.title)
    .bind(input.description)
    .bind(input.requirements)
    .bind(input.location)
    .bind(input.salary)
    .bind(created_by)
    .fetch_one(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!(
        "SELECT {JOB_COLUMNS}
         FROM jobs j
         JOIN users u ON u.id = j.created_by
         WHERE j.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// All active postings, employer company joined in. This is the corpus the
/// recommendation engine extracts features from.
pub async fn fetch_active(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!(
        "SELECT {JOB_COLUMNS}
         FROM jobs j
         JOIN users u ON u.id = j.created_by
         WHERE j.is_active = TRUE"
    ))
    .fetch_all(pool)
    .await
}

pub async fn fetch_active_by_recency(pool: &PgPool, limit: i64) -> Result<Vec<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!(
        "SELECT {JOB_COLUMNS}
         FROM jobs j
         JOIN users u ON u.id = j.created_by
         WHERE j.is_active = TRUE
         ORDER BY j.created_at DESC
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &JobListParams) {
    if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.requirements ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.company ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(location) = params.location.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND j.location ILIKE ")
            .push_bind(format!("%{}%", location.trim()));
    }
    if let Some(min) = params.min_salary {
        qb.push(" AND j.salary >= ").push_bind(min);
    }
    if let Some(max) = params.max_salary {
        qb.push(" AND j.salary <= ").push_bind(max);
    }
}

fn order_clause(sort: Option<&str>) -> &'static str {
    match sort.unwrap_or("newest") {
        "oldest" => " ORDER BY j.created_at ASC",
        "salary-high" => " ORDER BY j.salary DESC NULLS LAST",
        "salary-low" => " ORDER BY j.salary ASC NULLS LAST",
        "company" => " ORDER BY u.company ASC NULLS LAST",
        _ => " ORDER BY j.created_at DESC",
    }
}

pub async fn fetch_filtered(
    pool: &PgPool,
    params: &JobListParams,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<Job>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "SELECT {JOB_COLUMNS}
         FROM jobs j
         JOIN users u ON u.id = j.created_by
         WHERE j.is_active = TRUE"
    ));
    push_filters(&mut qb, params);
    qb.push(order_clause(params.sort.as_deref()));
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
    }
    qb.build_query_as::<Job>().fetch_all(pool).await
}

pub async fn count_filtered(pool: &PgPool, params: &JobListParams) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*)
         FROM jobs j
         JOIN users u ON u.id = j.created_by
         WHERE j.is_active = TRUE",
    );
    push_filters(&mut qb, params);
    let row: (i64,) = qb.build_query_as().fetch_one(pool).await?;
    Ok(row.0)
}

pub async fn update(pool: &PgPool, id: Uuid, input: UpdateJob) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        "WITH updated AS (
             UPDATE jobs
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 requirements = COALESCE($4, requirements),
                 location = COALESCE($5, location),
                 salary = COALESCE($6, salary),
                 updated_at = now()
             WHERE id = $1
             RETURNING *
         )
         SELECT j.id, j.title, j.description, j.requirements, j.location, j.salary,
                u.company AS company, j.created_by, j.is_active, j.created_at, j.updated_at
         FROM updated j
         JOIN users u ON u.id = j.created_by",
    )
    .bind(id)
    .bind(input.title)
    .bind(input.description)
    .bind(input.requirements)
    .bind(input.location)
    .bind(input.salary)
    .fetch_optional(pool)
    .await
}

/// Soft delete: postings are deactivated, never removed, so historical
/// applications keep their join target.
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE jobs SET is_active = FALSE, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
