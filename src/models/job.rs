use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// A job posting joined with the posting employer's company name. The engine
// treats this as an immutable snapshot; nothing here is mutated after load.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: Option<BigDecimal>,
    pub company: Option<String>,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJob {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: Option<BigDecimal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub salary: Option<BigDecimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JobListParams {
    pub search: Option<String>,
    pub location: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub all: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total_jobs: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}
