use std::collections::HashMap;

use bigdecimal::ToPrimitive;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Job;
use crate::services::text_analysis::normalize;
use crate::services::vectorizer::{SparseVector, TfidfVectorizer, VectorizerError};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("text vectorization failed: {0}")]
    Vectorization(#[from] VectorizerError),
}

/// Per-job scoring features: the TF-IDF text vector and the z-scored salary.
#[derive(Debug, Clone)]
pub struct JobFeatures {
    pub text_vector: SparseVector,
    pub normalized_salary: f64,
}

/// One extraction cycle's output: the per-job feature index plus the fitted
/// weighting model. Keeping the model alongside the vectors matters: a
/// preference string scored against these vectors must be projected through
/// this exact fit, never a fresh one.
#[derive(Debug)]
pub struct ExtractedFeatures {
    index: HashMap<Uuid, JobFeatures>,
    vectorizer: TfidfVectorizer,
}

impl ExtractedFeatures {
    pub fn job_count(&self) -> usize {
        self.index.len()
    }

    pub fn get(&self, job_id: &Uuid) -> Option<&JobFeatures> {
        self.index.get(job_id)
    }

    /// Projects free text (e.g. a joined keyword preference string) into the
    /// same vector space the job corpus was fitted in.
    pub fn project(&self, text: &str) -> SparseVector {
        self.vectorizer.transform(text)
    }
}

/// Builds the feature index for a job corpus. Callers short-circuit on an
/// empty corpus; a non-empty corpus whose documents all normalize to nothing
/// still fails with `EmptyVocabulary` and is handled by the fallback path.
pub fn extract(jobs: &[Job]) -> Result<ExtractedFeatures, ExtractionError> {
    let documents: Vec<String> = jobs.iter().map(document_for).collect();
    let (vectorizer, vectors) = TfidfVectorizer::fit(&documents)?;

    let salaries: Vec<f64> = jobs.iter().map(salary_value).collect();
    let normalized = zscore(&salaries);

    let index = jobs
        .iter()
        .zip(vectors)
        .zip(normalized)
        .map(|((job, text_vector), normalized_salary)| {
            (
                job.id,
                JobFeatures {
                    text_vector,
                    normalized_salary,
                },
            )
        })
        .collect();

    Ok(ExtractedFeatures { index, vectorizer })
}

/// The searchable document for one posting: every text field plus the
/// employer company, normalized into the engine's canonical form.
fn document_for(job: &Job) -> String {
    normalize(&format!(
        "{} {} {} {} {}",
        job.title,
        job.description,
        job.requirements,
        job.location,
        job.company.as_deref().unwrap_or("")
    ))
}

fn salary_value(job: &Job) -> f64 {
    job.salary
        .as_ref()
        .and_then(|s| s.to_f64())
        .unwrap_or(0.0)
}

/// Z-score over the salary column. A zero-variance column maps to all
/// zeros instead of dividing by zero.
fn zscore(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std_dev).collect()
}
