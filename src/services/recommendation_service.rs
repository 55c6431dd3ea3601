use std::cmp::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{Job, RecommendationOutcome, UserProfile};
use crate::repo::{ApplicationRepository, JobRepository, RepositoryError};
use crate::services::feature_extraction::{self, ExtractedFeatures, ExtractionError};
use crate::services::profile_service;
use crate::services::vectorizer::cosine_similarity;

pub const DEFAULT_MAX_RESULTS: usize = 6;

const TEXT_WEIGHT: f64 = 0.4;
const SALARY_WEIGHT: f64 = 0.3;
const COMPANY_WEIGHT: f64 = 0.2;
const LOCATION_WEIGHT: f64 = 0.1;

#[derive(Debug, Error)]
enum RecommendError {
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),

    #[error("feature extraction failure: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Personalized job ranking over in-memory caches.
///
/// One long-lived instance owns two caches: the job feature index, rebuilt
/// whenever the active-posting count drifts from the cached count, and
/// per-user preference profiles, computed once per user and kept for the
/// instance's whole lifetime. Callers that need fresh profiles construct a
/// new recommender; there is deliberately no invalidation API.
///
/// Concurrent `recommend` calls are safe: each call captures an `Arc`
/// snapshot of the feature index up front, so a rebuild swapping the cache
/// underneath is never observed mid-scoring.
pub struct JobRecommender {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    features: RwLock<Option<Arc<ExtractedFeatures>>>,
    profiles: DashMap<Uuid, Arc<UserProfile>>,
}

impl JobRecommender {
    pub fn new(jobs: Arc<dyn JobRepository>, applications: Arc<dyn ApplicationRepository>) -> Self {
        Self {
            jobs,
            applications,
            features: RwLock::new(None),
            profiles: DashMap::new(),
        }
    }

    /// Ranks active postings for a user. Never fails: any error inside the
    /// pipeline is logged and answered with the most recent active postings
    /// instead, tagged as `Fallback` so callers can tell the paths apart.
    pub async fn recommend(&self, user_id: Uuid, max_results: usize) -> RecommendationOutcome {
        match self.rank(user_id, max_results).await {
            Ok(jobs) => {
                info!("Ranked {} recommendations for user {}", jobs.len(), user_id);
                RecommendationOutcome::Ranked(jobs)
            }
            Err(e) => {
                warn!("Recommendation pipeline failed for user {}: {}", user_id, e);
                self.fallback(max_results, e).await
            }
        }
    }

    async fn rank(&self, user_id: Uuid, max_results: usize) -> Result<Vec<Job>, RecommendError> {
        let active = self.jobs.fetch_active_jobs().await?;
        if active.is_empty() {
            return Ok(Vec::new());
        }

        let features = self.features_for(&active)?;
        let profile = self.profile_for(user_id).await?;

        let mut scored = score_jobs(&profile, &features, active);
        // Descending by score; the sort is stable, so equal scores keep
        // their original relative order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .take(max_results)
            .map(|(job, _)| job)
            .collect())
    }

    /// Cache discipline: reuse the snapshot while its entry count matches the
    /// current active-posting count, otherwise rebuild and swap. The count
    /// check is approximate by design; a same-sized corpus with different
    /// contents keeps serving the old index.
    fn features_for(&self, active: &[Job]) -> Result<Arc<ExtractedFeatures>, RecommendError> {
        let cached = self.features.read().as_ref().map(Arc::clone);
        if let Some(cached) = cached {
            if cached.job_count() == active.len() {
                return Ok(cached);
            }
        }
        let rebuilt = Arc::new(feature_extraction::extract(active)?);
        info!("Rebuilt job feature index for {} active postings", active.len());
        *self.features.write() = Some(rebuilt.clone());
        Ok(rebuilt)
    }

    async fn profile_for(&self, user_id: Uuid) -> Result<Arc<UserProfile>, RecommendError> {
        if let Some(profile) = self.profiles.get(&user_id) {
            return Ok(Arc::clone(&profile));
        }
        let applied = self.applications.fetch_applied_jobs(user_id).await?;
        let profile = Arc::new(profile_service::build_profile(user_id, &applied));
        // First writer wins on a race; later computations are discarded.
        Ok(Arc::clone(&self.profiles.entry(user_id).or_insert(profile)))
    }

    async fn fallback(&self, max_results: usize, cause: RecommendError) -> RecommendationOutcome {
        let jobs = match self.jobs.fetch_active_jobs_by_recency(max_results).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Fallback job fetch failed too: {}", e);
                Vec::new()
            }
        };
        RecommendationOutcome::Fallback {
            jobs,
            reason: cause.to_string(),
        }
    }
}

/// The hand-tuned similarity blend. Each sub-score is skipped outright when
/// its preconditions fail so a missing signal contributes 0 instead of a
/// biased default. Jobs absent from the index are skipped entirely.
///
/// The salary term compares the profile's raw mean salary against the job's
/// z-scored salary. The unit mismatch is inherited from the original system
/// and kept: changing it would silently reorder results.
fn score_jobs(
    profile: &UserProfile,
    features: &ExtractedFeatures,
    jobs: Vec<Job>,
) -> Vec<(Job, f64)> {
    let preference_vector = if profile.top_keywords.is_empty() {
        None
    } else {
        let preference: Vec<&str> = profile.top_keywords.iter().map(|(k, _)| k.as_str()).collect();
        Some(features.project(&preference.join(" ")))
    };

    jobs.into_iter()
        .filter_map(|job| {
            let job_features = features.get(&job.id)?;
            let mut score = 0.0;

            if let Some(preference) = &preference_vector {
                score += cosine_similarity(preference, &job_features.text_vector) * TEXT_WEIGHT;
            }

            if profile.average_salary > 0.0 && job_features.normalized_salary > 0.0 {
                let diff = (profile.average_salary - job_features.normalized_salary).abs();
                score += 1.0 / (1.0 + diff) * SALARY_WEIGHT;
            }

            if let Some(count) = job.company.as_deref().and_then(|c| profile.company_count(c)) {
                score +=
                    count as f64 / profile.application_count.max(1) as f64 * COMPANY_WEIGHT;
            }

            if let Some(count) = profile.location_count(&job.location) {
                score +=
                    count as f64 / profile.application_count.max(1) as f64 * LOCATION_WEIGHT;
            }

            Some((job, score))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::services::profile_service::build_profile;

    fn job(title: &str, salary: Option<i64>, company: Option<&str>, location: &str) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{} position", title),
            requirements: "experience".to_string(),
            location: location.to_string(),
            salary: salary.map(BigDecimal::from),
            company: company.map(String::from),
            created_by: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_applied_job_outranks_unrelated_one() {
        let backend = job("Backend Engineer", Some(100_000), Some("Acme"), "Berlin");
        let painter = job("Painter", Some(40_000), Some("ArtCo"), "Madrid");
        let corpus = vec![backend.clone(), painter.clone()];

        let features = feature_extraction::extract(&corpus).unwrap();
        let profile = build_profile(Uuid::new_v4(), &[backend.clone()]);

        let scored = score_jobs(&profile, &features, corpus);
        let score_of = |id: Uuid| scored.iter().find(|(j, _)| j.id == id).unwrap().1;
        assert!(score_of(backend.id) >= score_of(painter.id));
        assert!(score_of(backend.id) > 0.0);
    }

    #[test]
    fn test_empty_profile_contributes_no_text_or_affinity_score() {
        let a = job("Backend Engineer", Some(100_000), Some("Acme"), "Berlin");
        let corpus = vec![a.clone()];
        let features = feature_extraction::extract(&corpus).unwrap();
        let profile = build_profile(Uuid::new_v4(), &[]);

        let scored = score_jobs(&profile, &features, corpus);
        assert_eq!(scored[0].1, 0.0);
    }

    #[test]
    fn test_company_affinity_scales_with_application_share() {
        let acme_a = job("Engineer", None, Some("Acme"), "Berlin");
        let acme_b = job("Engineer", None, Some("Acme"), "Berlin");
        let other = job("Designer", None, Some("Studio"), "Paris");
        let profile = build_profile(
            Uuid::new_v4(),
            &[acme_a.clone(), acme_b.clone(), other.clone()],
        );

        // 2 of 3 applications went to Acme.
        assert_eq!(profile.company_count("Acme"), Some(2));
        let corpus = vec![acme_a.clone()];
        let features = feature_extraction::extract(&corpus).unwrap();
        let scored = score_jobs(&profile, &features, corpus);

        let company_part = 2.0 / 3.0 * COMPANY_WEIGHT;
        // Text and location also match here, so the total must be at least
        // the company share.
        assert!(scored[0].1 >= company_part);
    }

    #[test]
    fn test_jobs_missing_from_index_are_skipped() {
        let indexed = job("Engineer", None, None, "Berlin");
        let unindexed = job("Ghost", None, None, "Nowhere");
        let features = feature_extraction::extract(&[indexed.clone()]).unwrap();
        let profile = build_profile(Uuid::new_v4(), &[indexed.clone()]);

        let scored = score_jobs(&profile, &features, vec![indexed.clone(), unindexed]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].0.id, indexed.id);
    }

    #[test]
    fn test_salary_subscore_requires_both_sides_positive() {
        // Profile has a salary history but the job's z-scored salary is the
        // corpus minimum (negative), so the salary term must be skipped.
        let low = job("Engineer", Some(10_000), None, "Berlin");
        let high = job("Curator", Some(90_000), None, "Oslo");
        let corpus = vec![low.clone(), high.clone()];
        let features = feature_extraction::extract(&corpus).unwrap();

        let profile = build_profile(Uuid::new_v4(), &[low.clone()]);
        assert!(profile.average_salary > 0.0);
        assert!(features.get(&low.id).unwrap().normalized_salary < 0.0);

        let scored = score_jobs(&profile, &features, vec![low.clone()]);
        // Remaining signal is text + location only.
        let expected_max = TEXT_WEIGHT + LOCATION_WEIGHT;
        assert!(scored[0].1 <= expected_max + 1e-9);
    }
}
