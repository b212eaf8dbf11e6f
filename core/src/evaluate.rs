//! Interpolated precision/recall over the positions of relevant hits.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, TermsetError};
use crate::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecall {
    pub precision: f64,
    pub recall: f64,
}

/// `(precision, recall)` recorded at every rank holding a relevant document.
pub fn recall_points<I>(ranked: I, relevant: &HashSet<DocId>) -> Result<Vec<(f64, f64)>>
where
    I: IntoIterator<Item = DocId>,
{
    if relevant.is_empty() {
        return Err(TermsetError::NoRelevantDocuments);
    }
    let total = relevant.len() as f64;
    let mut hits = 0usize;
    let points = ranked
        .into_iter()
        .enumerate()
        .filter_map(|(pos, doc)| {
            if !relevant.contains(&doc) {
                return None;
            }
            hits += 1;
            Some((hits as f64 / (pos + 1) as f64, hits as f64 / total))
        })
        .collect();
    Ok(points)
}

/// Average the precision and recall recorded at relevant-hit positions.
///
/// Fails when no relevant document shows up in the ranking: a ranking covers
/// the whole collection, so the judgments reference unknown documents.
pub fn precision_recall<I>(ranked: I, relevant: &HashSet<DocId>) -> Result<PrecisionRecall>
where
    I: IntoIterator<Item = DocId>,
{
    let points = recall_points(ranked, relevant)?;
    if points.is_empty() {
        return Err(TermsetError::NoRelevantRetrieved { relevant: relevant.len() });
    }
    let precision = mean(points.iter().map(|(p, _)| *p)).unwrap_or(0.0);
    let recall = mean(points.iter().map(|(_, r)| *r)).unwrap_or(0.0);
    Ok(PrecisionRecall { precision, recall })
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[DocId]) -> HashSet<DocId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn averages_over_relevant_positions() {
        // relevant at ranks 1 and 3: p = [1, 2/3], r = [1/2, 1]
        let pr = precision_recall([4, 2, 7, 1], &set(&[4, 7])).unwrap();
        assert!((pr.precision - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((pr.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn recall_points_only_at_hits() {
        let points = recall_points([5, 1, 2], &set(&[1, 2])).unwrap();
        assert_eq!(points, vec![(0.5, 0.5), (2.0 / 3.0, 1.0)]);
    }

    #[test]
    fn empty_relevance_set_fails() {
        assert_eq!(precision_recall([1, 2], &HashSet::new()), Err(TermsetError::NoRelevantDocuments));
    }

    #[test]
    fn unretrieved_relevant_documents_are_an_error() {
        assert_eq!(
            precision_recall([1, 2], &set(&[9])),
            Err(TermsetError::NoRelevantRetrieved { relevant: 1 })
        );
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(Vec::new()), None);
        assert_eq!(mean(vec![1.0, 2.0]), Some(1.5));
    }
}
