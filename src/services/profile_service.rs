use uuid::Uuid;

use bigdecimal::ToPrimitive;

use crate::models::{Job, UserProfile};
use crate::services::text_analysis::{normalize, tokenize};

const TOP_KEYWORDS: usize = 20;
const TOP_COMPANIES: usize = 10;
const TOP_LOCATIONS: usize = 10;

/// Multiset that remembers first-seen order, so `most_common` breaks count
/// ties deterministically by insertion order rather than hash order.
#[derive(Debug, Default)]
struct FrequencyTable {
    entries: Vec<(String, u32)>,
    positions: std::collections::HashMap<String, usize>,
}

impl FrequencyTable {
    fn add(&mut self, key: &str) {
        match self.positions.get(key) {
            Some(&pos) => self.entries[pos].1 += 1,
            None => {
                self.positions.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    fn most_common(&self, n: usize) -> Vec<(String, u32)> {
        let mut ranked = self.entries.clone();
        // Stable sort: equal counts keep first-seen order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Aggregates a user's applied-to jobs into a preference profile. With no
/// applications every table is empty, the salary is 0.0 and the count 0;
/// downstream sub-scores treat those as "no signal", not as a weak match.
pub fn build_profile(user_id: Uuid, applied_jobs: &[Job]) -> UserProfile {
    let mut keywords = FrequencyTable::default();
    let mut companies = FrequencyTable::default();
    let mut locations = FrequencyTable::default();
    let mut salaries: Vec<f64> = Vec::new();

    for job in applied_jobs {
        let text = normalize(&format!("{} {}", job.title, job.description));
        for word in tokenize(&text) {
            keywords.add(&word);
        }
        if let Some(salary) = job.salary.as_ref().and_then(|s| s.to_f64()) {
            salaries.push(salary);
        }
        if let Some(company) = job.company.as_deref().filter(|c| !c.is_empty()) {
            companies.add(company);
        }
        if !job.location.is_empty() {
            locations.add(&job.location);
        }
    }

    let average_salary = if salaries.is_empty() {
        0.0
    } else {
        salaries.iter().sum::<f64>() / salaries.len() as f64
    };

    UserProfile {
        user_id,
        top_keywords: keywords.most_common(TOP_KEYWORDS),
        average_salary,
        top_companies: companies.most_common(TOP_COMPANIES),
        top_locations: locations.most_common(TOP_LOCATIONS),
        application_count: applied_jobs.len(),
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;

    fn job(title: &str, description: &str, salary: Option<i64>, company: Option<&str>, location: &str) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            requirements: String::new(),
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
    fn test_empty_history_yields_empty_profile() {
        let profile = build_profile(Uuid::new_v4(), &[]);
        assert_eq!(profile.application_count, 0);
        assert_eq!(profile.average_salary, 0.0);
        assert!(profile.top_keywords.is_empty());
        assert!(profile.top_companies.is_empty());
        assert!(profile.top_locations.is_empty());
    }

    #[test]
    fn test_keyword_counts_accumulate_across_jobs() {
        let jobs = vec![
            job("Rust Engineer", "rust services", None, None, "Berlin"),
            job("Rust Developer", "tooling", None, None, "Berlin"),
        ];
        let profile = build_profile(Uuid::new_v4(), &jobs);
        let rust = profile
            .top_keywords
            .iter()
            .find(|(k, _)| k == "rust")
            .unwrap();
        assert_eq!(rust.1, 3);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let jobs = vec![job("alpha beta gamma", "", None, None, "X")];
        let profile = build_profile(Uuid::new_v4(), &jobs);
        let keys: Vec<&str> = profile.top_keywords.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_keyword_table_is_capped_at_twenty() {
        // 26 distinct two-letter words, more than the cap.
        let text: String = ('a'..='z').map(|c| format!("{c}{c} ")).collect();
        let jobs = vec![job(&text, "", None, None, "X")];
        let profile = build_profile(Uuid::new_v4(), &jobs);
        assert!(profile.top_keywords.len() <= 20);
    }

    #[test]
    fn test_average_salary_skips_missing_values() {
        let jobs = vec![
            job("A", "", Some(100_000), None, "X"),
            job("B", "", None, None, "X"),
            job("C", "", Some(50_000), None, "X"),
        ];
        let profile = build_profile(Uuid::new_v4(), &jobs);
        assert_eq!(profile.average_salary, 75_000.0);
        assert_eq!(profile.application_count, 3);
    }

    #[test]
    fn test_company_and_location_tables() {
        let jobs = vec![
            job("A", "", None, Some("Acme"), "Berlin"),
            job("B", "", None, Some("Acme"), "Munich"),
            job("C", "", None, Some("ArtCo"), "Berlin"),
            job("D", "", None, None, "Berlin"),
        ];
        let profile = build_profile(Uuid::new_v4(), &jobs);
        assert_eq!(profile.company_count("Acme"), Some(2));
        assert_eq!(profile.company_count("ArtCo"), Some(1));
        assert_eq!(profile.company_count("Unknown"), None);
        assert_eq!(profile.location_count("Berlin"), Some(3));
        assert_eq!(profile.location_count("Munich"), Some(1));
    }
}
