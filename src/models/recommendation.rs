use serde::Serialize;
use uuid::Uuid;

use crate::models::Job;

/// Aggregated preferences mined from a user's past applications.
///
/// The top-N tables keep first-seen order for equal counts, so ranking is
/// deterministic across runs. `average_salary` is the raw arithmetic mean of
/// applied-job salaries (0.0 when none of them had one).
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub top_keywords: Vec<(String, u32)>,
    pub average_salary: f64,
    pub top_companies: Vec<(String, u32)>,
    pub top_locations: Vec<(String, u32)>,
    pub application_count: usize,
}

impl UserProfile {
    pub fn company_count(&self, company: &str) -> Option<u32> {
        self.top_companies
            .iter()
            .find(|(c, _)| c == company)
            .map(|(_, n)| *n)
    }

    pub fn location_count(&self, location: &str) -> Option<u32> {
        self.top_locations
            .iter()
            .find(|(l, _)| l == location)
            .map(|(_, n)| *n)
    }
}

/// How a recommendation list was produced. `Fallback` carries the reason the
/// ranking pipeline was abandoned so callers and tests can tell the paths
/// apart without parsing logs.
#[derive(Debug)]
pub enum RecommendationOutcome {
    Ranked(Vec<Job>),
    Fallback { jobs: Vec<Job>, reason: String },
}

impl RecommendationOutcome {
    pub fn jobs(&self) -> &[Job] {
        match self {
            RecommendationOutcome::Ranked(jobs) => jobs,
            RecommendationOutcome::Fallback { jobs, .. } => jobs,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RecommendationOutcome::Fallback { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendedJob {
    #[serde(flatten)]
    pub job: Job,
    pub recommended: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendedJob>,
    pub count: usize,
    pub fallback: bool,
}
