use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    Rejected,
    Hired,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub applied_at: chrono::DateTime<chrono::Utc>,
}

// Listing view: an application together with the posting it targets, as the
// dashboard shows it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationWithJob {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_username: String,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub applied_at: chrono::DateTime<chrono::Utc>,
    pub job_title: String,
    pub job_location: String,
    pub job_company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplication {
    pub job_id: Uuid,
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationStatus {
    pub status: ApplicationStatus,
}
