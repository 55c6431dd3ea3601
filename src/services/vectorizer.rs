use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::services::text_analysis::{is_stop_word, tokenize};

/// Vocabulary cap: only the most frequent terms across the corpus get an
/// index. Everything else is treated as out-of-vocabulary and contributes
/// nothing to similarity.
pub const MAX_VOCABULARY: usize = 5000;

const MIN_TOKEN_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum VectorizerError {
    #[error("empty vocabulary: no terms survived tokenization")]
    EmptyVocabulary,
}

/// Sparse term-weight vector, L2-normalized at construction. Entries are
/// sorted by term index so dot products are a linear merge.
#[derive(Debug, Clone, Default)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(idx, _)| *idx);
        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity between two L2-normalized sparse vectors. Weights are
/// non-negative, so the result lands in [0, 1]; clamped against float drift.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    a.dot(b).clamp(0.0, 1.0)
}

/// TF-IDF weighting model fitted over a document corpus.
///
/// Term weight is raw in-document frequency times smoothed inverse document
/// frequency, `ln((1 + n) / (1 + df)) + 1`, and every document vector is
/// L2-normalized. The fitted vocabulary and IDF table are kept so later
/// queries (`transform`) project into the same space the corpus was fitted
/// in; refitting between fit and query would make cosine scores meaningless.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fits the model and returns it together with one vector per document,
    /// in input order.
    pub fn fit(documents: &[String]) -> Result<(Self, Vec<SparseVector>), VectorizerError> {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| {
                tokenize(doc)
                    .into_iter()
                    .filter(|t| t.len() >= MIN_TOKEN_LEN && !is_stop_word(t))
                    .collect()
            })
            .collect();

        let mut total_counts: HashMap<&str, u64> = HashMap::new();
        let mut doc_frequencies: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_frequencies.entry(term).or_insert(0) += 1;
            }
            for term in tokens {
                *total_counts.entry(term).or_insert(0) += 1;
            }
        }

        if total_counts.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }

        // Cap the vocabulary at the most frequent corpus terms, alphabetical
        // on equal counts so index assignment is deterministic.
        let mut ranked: Vec<(&str, u64)> = total_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(MAX_VOCABULARY);

        let mut terms: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, term) in terms.into_iter().enumerate() {
            let df = doc_frequencies[term] as f64;
            vocabulary.insert(term.to_string(), index);
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
        }

        let model = Self { vocabulary, idf };
        let vectors = tokenized
            .iter()
            .map(|tokens| model.vectorize(tokens.iter().map(String::as_str)))
            .collect();
        Ok((model, vectors))
    }

    /// Projects arbitrary text into the fitted space. Out-of-vocabulary
    /// terms are dropped; text with no known terms yields the zero vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let tokens = tokenize(text);
        self.vectorize(
            tokens
                .iter()
                .map(String::as_str)
                .filter(|t| t.len() >= MIN_TOKEN_LEN && !is_stop_word(t)),
        )
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn vectorize<'a>(&self, tokens: impl Iterator<Item = &'a str>) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        let weighted = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        SparseVector::from_weights(weighted)
    }
}
