use indexmap::IndexMap;
use once_cell::sync::Lazy;
use ordered_float::OrderedFloat;
use regex::Regex;
use tracing::debug;

use crate::logging::MATCHING;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern"));

/// Lowercased word tokens of two or more characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// A sparse row, sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
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

pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        0.0
    } else {
        a.dot(b) / denom
    }
}

/// Term-frequency / inverse-document-frequency weighting with smoothed idf
/// and L2-normalized rows.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: IndexMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Self {
        let mut vocabulary: IndexMap<String, usize> = IndexMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for document in corpus {
            let mut tokens = tokenize(document.as_ref());
            tokens.sort();
            tokens.dedup();
            for token in tokens {
                let next = vocabulary.len();
                let idx = *vocabulary.entry(token).or_insert(next);
                if idx == document_frequency.len() {
                    document_frequency.push(0);
                }
                document_frequency[idx] += 1;
            }
        }

        let n = corpus.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|df| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        debug!(target: MATCHING, documents = corpus.len(), terms = vocabulary.len(), "Fitted vectorizer");
        TfidfVectorizer { vocabulary, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Projects `text` into the fitted space. Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: IndexMap<usize, f64> = IndexMap::new();
        for token in tokenize(text) {
            if let Some(idx) = self.vocabulary.get(&token) {
                *counts.entry(*idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in entries.iter_mut() {
                *w /= norm;
            }
        }

        SparseVector { entries }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub score: f64,
}

/// Nearest-neighbour lookup over a fixed candidate list.
///
/// Every query is scored against every candidate; there is no index.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    vectorizer: TfidfVectorizer,
    candidates: Vec<SparseVector>,
}

impl FuzzyMatcher {
    /// Fits the vocabulary on the candidates themselves.
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> Self {
        let vectorizer = TfidfVectorizer::fit(candidates);
        Self::with_vectorizer(vectorizer, candidates)
    }

    /// Uses a vocabulary fitted elsewhere, e.g. over the union of two datasets.
    pub fn with_vectorizer<S: AsRef<str>>(vectorizer: TfidfVectorizer, candidates: &[S]) -> Self {
        let candidates = candidates
            .iter()
            .map(|c| vectorizer.transform(c.as_ref()))
            .collect();
        FuzzyMatcher {
            vectorizer,
            candidates,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let query = self.vectorizer.transform(query);
        self.candidates
            .iter()
            .map(|candidate| cosine_similarity(&query, candidate))
            .collect()
    }

    /// Highest-scoring candidate, kept only when it reaches `threshold`.
    /// Ties resolve to the earliest candidate.
    pub fn best_match(&self, query: &str, threshold: f64) -> Option<Match> {
        let best = self
            .similarities(query)
            .into_iter()
            .enumerate()
            .fold(None, |best: Option<Match>, (index, score)| match best {
                Some(b) if b.score >= score => Some(b),
                _ => Some(Match { index, score }),
            })?;

        if best.score >= threshold {
            Some(best)
        } else {
            debug!(target: MATCHING, best = best.score, threshold, "No candidate reached threshold");
            None
        }
    }

    /// The `k` closest candidates, best first.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .similarities(query)
            .into_iter()
            .enumerate()
            .map(|(index, score)| Match { index, score })
            .collect();
        matches.sort_by_key(|m| std::cmp::Reverse(OrderedFloat(m.score)));
        matches.truncate(k);
        matches
    }
}
