//! End-to-end tests of the recommendation engine over in-memory
//! repositories: ranking, caching, truncation, ordering, and the fallback
//! path, without a live database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use uuid::Uuid;

use jobportal_backend::models::{Job, RecommendationOutcome};
use jobportal_backend::repo::{ApplicationRepository, JobRepository, RepositoryError};
use jobportal_backend::services::recommendation_service::JobRecommender;

fn job(title: &str, salary: Option<i64>, company: Option<&str>, location: &str, age_days: i64) -> Job {
    let created = Utc::now() - Duration::days(age_days);
    Job {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{} position", title),
        requirements: "relevant experience".to_string(),
        location: location.to_string(),
        salary: salary.map(BigDecimal::from),
        company: company.map(String::from),
        created_by: Uuid::new_v4(),
        is_active: true,
        created_at: created,
        updated_at: created,
    }
}

#[derive(Default)]
struct FakeJobRepo {
    jobs: Mutex<Vec<Job>>,
    fail_active: bool,
    active_calls: AtomicUsize,
    recency_calls: AtomicUsize,
}

impl FakeJobRepo {
    fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail_active: true,
            ..Self::default()
        }
    }

    fn push(&self, job: Job) {
        self.jobs.lock().unwrap().push(job);
    }
}

#[async_trait]
impl JobRepository for FakeJobRepo {
    async fn fetch_active_jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        self.active_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_active {
            return Err(RepositoryError::Unavailable("jobs table offline".into()));
        }
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn fetch_active_jobs_by_recency(
        &self,
        limit: usize,
    ) -> Result<Vec<Job>, RepositoryError> {
        self.recency_calls.fetch_add(1, Ordering::SeqCst);
        let mut jobs = self.jobs.lock().unwrap().clone();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        Ok(jobs)
    }
}

struct FakeApplicationRepo {
    applied: Vec<Job>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeApplicationRepo {
    fn with_history(applied: Vec<Job>) -> Self {
        Self {
            applied,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            applied: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ApplicationRepository for FakeApplicationRepo {
    async fn fetch_applied_jobs(&self, _applicant_id: Uuid) -> Result<Vec<Job>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RepositoryError::Unavailable(
                "applications table offline".into(),
            ));
        }
        Ok(self.applied.clone())
    }
}

fn recommender(
    jobs: Arc<FakeJobRepo>,
    applications: Arc<FakeApplicationRepo>,
) -> JobRecommender {
    JobRecommender::new(jobs, applications)
}

#[tokio::test]
async fn applied_to_job_ranks_at_or_above_unrelated_job() {
    let backend = job("Backend Engineer", Some(100_000), Some("Acme"), "Berlin", 1);
    let painter = job("Painter", Some(40_000), Some("ArtCo"), "Madrid", 2);

    let jobs = Arc::new(FakeJobRepo::with_jobs(vec![backend.clone(), painter.clone()]));
    let apps = Arc::new(FakeApplicationRepo::with_history(vec![backend.clone()]));
    let engine = recommender(jobs, apps);

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    assert!(!outcome.is_fallback());
    let ranked = outcome.jobs();
    assert!(!ranked.is_empty());
    assert_eq!(ranked[0].id, backend.id);
}

#[tokio::test]
async fn never_returns_more_than_max_results() {
    let applied = job("Rust Engineer", Some(90_000), Some("Acme"), "Berlin", 1);
    let mut corpus: Vec<Job> = (0..10)
        .map(|i| job("Rust Engineer", Some(90_000), Some("Acme"), "Berlin", i))
        .collect();
    corpus.push(applied.clone());

    let jobs = Arc::new(FakeJobRepo::with_jobs(corpus));
    let apps = Arc::new(FakeApplicationRepo::with_history(vec![applied]));
    let engine = recommender(jobs, apps);

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    assert!(!outcome.is_fallback());
    assert!(outcome.jobs().len() <= 6);
}

#[tokio::test]
async fn zero_score_jobs_are_excluded() {
    // The user's history matches the backend postings only; the unrelated
    // posting shares no terms, company, or location and has no salary, so
    // its score is exactly zero and it must not appear.
    let applied = job("Backend Engineer", None, Some("Acme"), "Berlin", 1);
    let matching = job("Backend Engineer", None, Some("Acme"), "Berlin", 2);
    let mut unrelated = job("Sculptor", None, Some("StoneWorks"), "Lisbon", 3);
    // No shared vocabulary with the applied-to posting.
    unrelated.description = "stone carving studio".to_string();
    unrelated.requirements = "chisel mastery".to_string();

    let jobs = Arc::new(FakeJobRepo::with_jobs(vec![
        applied.clone(),
        matching.clone(),
        unrelated.clone(),
    ]));
    let apps = Arc::new(FakeApplicationRepo::with_history(vec![applied.clone()]));
    let engine = recommender(jobs, apps);

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    assert!(!outcome.is_fallback());
    let ids: Vec<Uuid> = outcome.jobs().iter().map(|j| j.id).collect();
    assert!(ids.contains(&applied.id));
    assert!(ids.contains(&matching.id));
    assert!(!ids.contains(&unrelated.id));
}

#[tokio::test]
async fn equal_scores_preserve_input_order() {
    let applied = job("Rust Engineer", None, None, "Berlin", 1);
    // Twins: identical text, company, location, salary -- identical scores.
    let twin_a = job("Rust Engineer", None, None, "Berlin", 2);
    let twin_b = job("Rust Engineer", None, None, "Berlin", 3);

    let jobs = Arc::new(FakeJobRepo::with_jobs(vec![
        twin_a.clone(),
        twin_b.clone(),
        applied.clone(),
    ]));
    let apps = Arc::new(FakeApplicationRepo::with_history(vec![applied.clone()]));
    let engine = recommender(jobs, apps);

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    let ids: Vec<Uuid> = outcome.jobs().iter().map(|j| j.id).collect();
    let pos_a = ids.iter().position(|id| *id == twin_a.id).unwrap();
    let pos_b = ids.iter().position(|id| *id == twin_b.id).unwrap();
    assert!(pos_a < pos_b);
}

#[tokio::test]
async fn zero_active_jobs_short_circuits() {
    let jobs = Arc::new(FakeJobRepo::with_jobs(Vec::new()));
    let apps = Arc::new(FakeApplicationRepo::with_history(Vec::new()));
    let engine = recommender(jobs.clone(), apps.clone());

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    assert!(!outcome.is_fallback());
    assert!(outcome.jobs().is_empty());

    // Only the active-jobs fetch may have happened.
    assert_eq!(jobs.active_calls.load(Ordering::SeqCst), 1);
    assert_eq!(jobs.recency_calls.load(Ordering::SeqCst), 0);
    assert_eq!(apps.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn job_repository_failure_falls_back_without_erroring() {
    let jobs = Arc::new(FakeJobRepo::failing());
    jobs.push(job("Old Posting", None, None, "Berlin", 10));
    jobs.push(job("New Posting", None, None, "Berlin", 0));
    jobs.push(job("Mid Posting", None, None, "Berlin", 5));
    let apps = Arc::new(FakeApplicationRepo::with_history(Vec::new()));
    let engine = recommender(jobs.clone(), apps);

    let outcome = engine.recommend(Uuid::new_v4(), 2).await;
    match outcome {
        RecommendationOutcome::Fallback { jobs: fallback, reason } => {
            assert_eq!(fallback.len(), 2);
            assert_eq!(fallback[0].title, "New Posting");
            assert_eq!(fallback[1].title, "Mid Posting");
            assert!(reason.contains("jobs table offline"));
        }
        RecommendationOutcome::Ranked(_) => panic!("expected fallback outcome"),
    }
    assert_eq!(jobs.recency_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn application_repository_failure_falls_back() {
    let corpus = vec![
        job("Backend Engineer", Some(100_000), Some("Acme"), "Berlin", 3),
        job("Frontend Engineer", Some(95_000), Some("Acme"), "Berlin", 1),
    ];
    let jobs = Arc::new(FakeJobRepo::with_jobs(corpus));
    let apps = Arc::new(FakeApplicationRepo::failing());
    let engine = recommender(jobs, apps);

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    assert!(outcome.is_fallback());
    // Newest first.
    assert_eq!(outcome.jobs()[0].title, "Frontend Engineer");
}

#[tokio::test]
async fn degenerate_corpus_text_falls_back() {
    // Every text field normalizes to nothing, so the vectorizer cannot fit
    // a vocabulary and the engine must take the recency fallback.
    let mut empty_text = job("12345", None, None, "77", 0);
    empty_text.description = "###".to_string();
    empty_text.requirements = "42".to_string();

    let jobs = Arc::new(FakeJobRepo::with_jobs(vec![empty_text]));
    let apps = Arc::new(FakeApplicationRepo::with_history(Vec::new()));
    let engine = recommender(jobs, apps);

    let outcome = engine.recommend(Uuid::new_v4(), 6).await;
    assert!(outcome.is_fallback());
}

#[tokio::test]
async fn user_profile_is_computed_once_per_instance() {
    let applied = job("Rust Engineer", None, Some("Acme"), "Berlin", 1);
    let jobs = Arc::new(FakeJobRepo::with_jobs(vec![applied.clone()]));
    let apps = Arc::new(FakeApplicationRepo::with_history(vec![applied]));
    let engine = recommender(jobs, apps.clone());

    let user = Uuid::new_v4();
    engine.recommend(user, 6).await;
    engine.recommend(user, 6).await;
    engine.recommend(user, 6).await;

    assert_eq!(apps.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn feature_index_is_rebuilt_when_job_count_changes() {
    let applied = job("Rust Engineer", None, Some("Acme"), "Berlin", 1);
    let jobs = Arc::new(FakeJobRepo::with_jobs(vec![applied.clone()]));
    let apps = Arc::new(FakeApplicationRepo::with_history(vec![applied.clone()]));
    let engine = recommender(jobs.clone(), apps);

    let user = Uuid::new_v4();
    let first = engine.recommend(user, 6).await;
    assert_eq!(first.jobs().len(), 1);

    // A new posting changes the active count, forcing a rebuild that must
    // index the newcomer.
    let newcomer = job("Rust Engineer", None, Some("Acme"), "Berlin", 0);
    jobs.push(newcomer.clone());

    let second = engine.recommend(user, 6).await;
    let ids: Vec<Uuid> = second.jobs().iter().map(|j| j.id).collect();
    assert!(ids.contains(&newcomer.id));
}
