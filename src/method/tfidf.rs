//! TF-IDF similarity index over catalog descriptions.
//!
//! Features are content unigrams plus adjacent-token bigrams. The vocabulary keeps the
//! `max_features` most frequent features across the catalog. Weights use smoothed idf
//! (`ln((1 + n) / (1 + df)) + 1`) and rows are L2-normalized, so cosine similarity is a dot
//! product over sparse vectors.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::data::ReferenceCatalog;

use super::text::tokenize;

type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone, PartialEq)]
/// Catalog entry ranked by similarity to a query.
pub struct SimilarCode {
    pub code: String,
    pub description: String,
    pub similarity: f64,
}

#[derive(Debug, Clone)]
struct IndexedRow {
    code: String,
    description: String,
    vector: SparseVector,
}

#[derive(Debug, Clone)]
pub struct TfidfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<IndexedRow>,
}

fn features(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let bigrams: Vec<String> = tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();
    tokens.into_iter().chain(bigrams).collect()
}

fn l2_normalize(vector: &mut SparseVector) {
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in vector.iter_mut() {
            *w /= norm;
        }
    }
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

impl TfidfIndex {
    pub fn build(catalog: &ReferenceCatalog, max_features: usize) -> Self {
        let documents: Vec<Vec<String>> =
            catalog.iter().map(|e| features(&e.description)).collect();

        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        for doc in &documents {
            for feature in doc {
                *corpus_counts.entry(feature.as_str()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut selected: Vec<&str> = ranked.into_iter().map(|(f, _)| f).collect();
        selected.sort_unstable();
        let vocabulary: HashMap<String, usize> = selected
            .iter()
            .enumerate()
            .map(|(i, f)| (f.to_string(), i))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in &documents {
            let mut seen: Vec<usize> = doc
                .iter()
                .filter_map(|f| vocabulary.get(f).copied())
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for idx in seen {
                document_frequency[idx] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(documents.len()),
        };

        for (entry, doc) in catalog.iter().zip(&documents) {
            let vector = index.vectorize(doc);
            index.rows.push(IndexedRow {
                code: entry.code.clone(),
                description: entry.description.clone(),
                vector,
            });
        }

        debug!(
            codes = index.rows.len(),
            features = index.vocabulary.len(),
            "TF-IDF index built"
        );

        index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    fn vectorize(&self, features: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for feature in features {
            if let Some(&idx) = self.vocabulary.get(feature) {
                *counts.entry(idx).or_default() += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        vector.sort_unstable_by_key(|(idx, _)| *idx);
        l2_normalize(&mut vector);
        vector
    }

    /// Cosine similarity of `text` against every indexed row, in catalog order.
    pub fn similarities(&self, text: &str) -> Vec<f64> {
        let query = self.vectorize(&features(text));
        self.rows.iter().map(|row| dot(&query, &row.vector)).collect()
    }

    /// Up to `k` rows with similarity at or above `min_similarity`, best first.
    ///
    /// Equal similarities keep catalog order.
    pub fn top_k(&self, text: &str, k: usize, min_similarity: f64) -> Vec<SimilarCode> {
        let scores = self.similarities(text);

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0 && *s >= min_similarity)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);

        ranked
            .into_iter()
            .map(|(i, similarity)| SimilarCode {
                code: self.rows[i].code.clone(),
                description: self.rows[i].description.clone(),
                similarity,
            })
            .collect()
    }
}
