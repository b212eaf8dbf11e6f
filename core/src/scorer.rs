//! Cosine scoring and document ranking.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{Result, TermsetError};
use crate::vectorizer::Matrix;
use crate::DocId;

/// Cosine similarity. Defined as 0 when either vector is all zeros.
pub fn similarity(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len());
    if u.iter().all(|x| *x == 0.0) || v.iter().all(|x| *x == 0.0) {
        return 0.0;
    }
    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    let nu = u.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nv = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    dot / (nu * nv)
}

/// All documents of a collection ordered by descending score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    entries: Vec<(DocId, f64)>,
}

impl Ranking {
    /// Sort `(doc, score)` pairs by score descending, ascending doc id on ties.
    pub fn from_scores(mut entries: Vec<(DocId, f64)>) -> Self {
        entries.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            ord => ord,
        });
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(DocId, f64)> {
        self.entries.iter()
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.entries.iter().map(|(d, _)| *d)
    }

    pub fn top(&self, k: usize) -> &[(DocId, f64)] {
        &self.entries[..k.min(self.entries.len())]
    }

    pub fn score(&self, doc_id: DocId) -> Option<f64> {
        self.entries.iter().find(|(d, _)| *d == doc_id).map(|(_, s)| *s)
    }
}

/// Score every document column (1-indexed) against the query and rank them.
/// Nothing is filtered; truncate with [`Ranking::top`].
pub fn rank_documents(query: &[f64], documents: &Matrix) -> Result<Ranking> {
    if query.len() != documents.rows() {
        return Err(TermsetError::DimensionMismatch {
            what: "query vector",
            expected: documents.rows(),
            found: query.len(),
        });
    }
    let scores = documents
        .columns()
        .enumerate()
        .map(|(col, doc_vec)| (col as DocId + 1, similarity(query, &doc_vec)))
        .collect();
    Ok(Ranking::from_scores(scores))
}
