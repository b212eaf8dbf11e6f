//! Batch pipeline: mine, vectorize, rank and evaluate a sequence of queries.
//!
//! Each query is processed independently against a shared read-only index.
//! Results are folded into a [`BatchResult`] owned by the caller, in query
//! order, whether the queries ran sequentially or in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::config::{round_score, ModelConfig};
use crate::error::{Result, TermsetError};
use crate::evaluate::{mean, precision_recall, PrecisionRecall};
use crate::miner::{mine_with_stats, MiningStats};
use crate::scorer::{rank_documents, Ranking};
use crate::vectorizer::{Matrix, QueryVectors, Vectorizer, WeightingMode};
use crate::{DocId, InvertedIndex, Term, TermWeights, TermsetOccurrences};

/// Mined termsets and vectors for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryModel {
    pub termsets: TermsetOccurrences,
    pub vectors: QueryVectors,
    pub stats: MiningStats,
}

impl QueryModel {
    /// The query's idf vector.
    pub fn query_vector(&self) -> &[f64] {
        &self.vectors.idf
    }

    pub fn document_vectors(&self) -> Result<Matrix> {
        self.vectors.document_vectors()
    }

    pub fn rank(&self) -> Result<Ranking> {
        rank_documents(self.query_vector(), &self.document_vectors()?)
    }
}

/// Full scoring output for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEvaluation {
    pub document_vectors: Matrix,
    pub ranking: Ranking,
    pub scores: PrecisionRecall,
}

/// Per-query line of a batch report. `precision`/`recall` are `None` when
/// the query could not be mined or had no relevance judgments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReport {
    /// 1-based position in the batch
    pub query: usize,
    pub termsets: usize,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub queries: Vec<QueryReport>,
}

impl BatchResult {
    pub fn precision(&self) -> Vec<Option<f64>> {
        self.queries.iter().map(|q| q.precision).collect()
    }

    pub fn recall(&self) -> Vec<Option<f64>> {
        self.queries.iter().map(|q| q.recall).collect()
    }

    /// Mean over evaluated queries only.
    pub fn mean_precision(&self) -> Option<f64> {
        mean(self.queries.iter().filter_map(|q| q.precision))
    }

    pub fn mean_recall(&self) -> Option<f64> {
        mean(self.queries.iter().filter_map(|q| q.recall))
    }

    pub fn evaluated(&self) -> usize {
        self.queries.iter().filter(|q| q.precision.is_some()).count()
    }
}

pub struct TermsetModel<'a> {
    index: &'a InvertedIndex,
    config: ModelConfig,
    vectorizer: Vectorizer,
    term_weights: Option<&'a TermWeights>,
}

impl<'a> TermsetModel<'a> {
    pub fn new(
        index: &'a InvertedIndex,
        config: ModelConfig,
        term_weights: Option<&'a TermWeights>,
    ) -> Result<Self> {
        config.validate()?;
        if config.mode == WeightingMode::IdfTnw && term_weights.is_none() {
            return Err(TermsetError::MissingTermWeights);
        }
        Ok(Self { index, config, vectorizer: Vectorizer::new(config.mode), term_weights })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn fit_query(&self, query: &[Term]) -> Result<QueryModel> {
        let (termsets, stats) = mine_with_stats(query, self.index, self.config.min_freq)?;
        let vectors = self.vectorizer.vectorize(&termsets, self.index, self.term_weights)?;
        Ok(QueryModel { termsets, vectors, stats })
    }

    /// Fit each query in order.
    pub fn fit(&self, queries: &[Vec<Term>]) -> Vec<Result<QueryModel>> {
        queries
            .iter()
            .enumerate()
            .map(|(i, q)| self.fit_logged(i, q))
            .collect()
    }

    /// Same as [`fit`](Self::fit), spreading queries over the rayon pool.
    pub fn fit_par(&self, queries: &[Vec<Term>]) -> Vec<Result<QueryModel>> {
        queries
            .par_iter()
            .enumerate()
            .map(|(i, q)| self.fit_logged(i, q))
            .collect()
    }

    fn fit_logged(&self, i: usize, query: &[Term]) -> Result<QueryModel> {
        let fitted = self.fit_query(query);
        match &fitted {
            Ok(m) => info!(
                query = i + 1,
                len = query.len(),
                frequent = m.termsets.len(),
                pruned = m.stats.pruned,
                "fitted query"
            ),
            Err(e) => warn!(query = i + 1, error = %e, "query skipped"),
        }
        fitted
    }

    pub fn evaluate_query(
        &self,
        fitted: &QueryModel,
        relevant: &HashSet<DocId>,
    ) -> Result<QueryEvaluation> {
        let num_docs = self.index.num_docs();
        if let Some(&doc_id) = relevant.iter().filter(|&&d| d == 0 || d > num_docs).min() {
            return Err(TermsetError::RelevantOutOfRange { doc_id, num_docs });
        }
        let document_vectors = fitted.document_vectors()?;
        let ranking = rank_documents(fitted.query_vector(), &document_vectors)?;
        let scores = precision_recall(ranking.doc_ids(), relevant)?;
        Ok(QueryEvaluation { document_vectors, ranking, scores })
    }

    /// Score fitted queries against their relevance sets. One relevance set
    /// is required per query.
    pub fn evaluate(
        &self,
        fitted: &[Result<QueryModel>],
        relevant: &[HashSet<DocId>],
    ) -> Result<BatchResult> {
        if fitted.len() != relevant.len() {
            return Err(TermsetError::DimensionMismatch {
                what: "relevance sets",
                expected: fitted.len(),
                found: relevant.len(),
            });
        }

        let mut batch = BatchResult::default();
        for (i, (model, rel)) in fitted.iter().zip(relevant).enumerate() {
            let report = match model {
                Err(e) => QueryReport {
                    query: i + 1,
                    termsets: 0,
                    precision: None,
                    recall: None,
                    error: Some(e.to_string()),
                },
                Ok(model) => match self.evaluate_query(model, rel) {
                    Ok(eval) => {
                        let p = round_score(eval.scores.precision);
                        let r = round_score(eval.scores.recall);
                        info!(query = i + 1, precision = p, recall = r, "evaluated query");
                        QueryReport {
                            query: i + 1,
                            termsets: model.termsets.len(),
                            precision: Some(p),
                            recall: Some(r),
                            error: None,
                        }
                    }
                    // A caller bug, not a per-query data problem.
                    Err(e @ TermsetError::DimensionMismatch { .. }) => return Err(e),
                    Err(e) => {
                        warn!(query = i + 1, error = %e, "query not evaluated");
                        QueryReport {
                            query: i + 1,
                            termsets: model.termsets.len(),
                            precision: None,
                            recall: None,
                            error: Some(e.to_string()),
                        }
                    }
                },
            };
            batch.queries.push(report);
        }
        Ok(batch)
    }

    /// Fit and evaluate in one pass.
    pub fn run(
        &self,
        queries: &[Vec<Term>],
        relevant: &[HashSet<DocId>],
        parallel: bool,
    ) -> Result<BatchResult> {
        let fitted = if parallel { self.fit_par(queries) } else { self.fit(queries) };
        self.evaluate(&fitted, relevant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Posting;

    fn index() -> InvertedIndex {
        let mut index = InvertedIndex::new(4);
        index.insert("a", vec![Posting::new(1, 3), Posting::new(2, 1), Posting::new(3, 1)]);
        index.insert("b", vec![Posting::new(1, 2), Posting::new(2, 1)]);
        index.insert("c", vec![Posting::new(4, 1)]);
        index
    }

    fn q(ts: &[&str]) -> Vec<Term> {
        ts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn idf_tnw_without_weights_is_rejected() {
        let index = index();
        let cfg = ModelConfig::new(1, WeightingMode::IdfTnw);
        assert!(matches!(TermsetModel::new(&index, cfg, None), Err(TermsetError::MissingTermWeights)));
    }

    #[test]
    fn batch_keeps_failed_queries_aligned() {
        let index = index();
        let model = TermsetModel::new(&index, ModelConfig::new(1, WeightingMode::Idf), None).unwrap();
        let queries = vec![q(&["a", "b"]), q(&["zzz"]), q(&["a"])];
        // doc 2 matches the query vector exactly and ranks first
        let relevant = vec![HashSet::from([2]), HashSet::from([2]), HashSet::new()];
        let batch = model.run(&queries, &relevant, false).unwrap();

        assert_eq!(batch.queries.len(), 3);
        assert_eq!(batch.precision()[0], Some(1.0));
        assert_eq!(batch.precision()[1], None);
        assert!(batch.queries[1].error.is_some());
        assert_eq!(batch.recall()[2], None);
        assert_eq!(batch.evaluated(), 1);
        assert_eq!(batch.mean_recall(), Some(1.0));
    }

    #[test]
    fn mismatched_relevance_count_is_an_error() {
        let index = index();
        let model = TermsetModel::new(&index, ModelConfig::new(1, WeightingMode::Idf), None).unwrap();
        let fitted = model.fit(&[q(&["a"])]);
        assert!(matches!(model.evaluate(&fitted, &[]), Err(TermsetError::DimensionMismatch { .. })));
    }

    #[test]
    fn out_of_range_relevance_is_reported_not_scored() {
        let index = index();
        let model = TermsetModel::new(&index, ModelConfig::new(1, WeightingMode::Idf), None).unwrap();
        let queries = vec![q(&["a"]), q(&["a"]), q(&["a"])];
        let relevant = vec![HashSet::from([99]), HashSet::from([1, 99]), HashSet::from([1])];
        let batch = model.run(&queries, &relevant, false).unwrap();

        assert_eq!(batch.precision(), vec![None, None, Some(1.0)]);
        assert_eq!(batch.recall(), vec![None, None, Some(1.0)]);
        assert!(batch.queries[0].error.as_deref().unwrap().contains("99"));
        assert!(batch.queries[1].error.is_some());
        assert_eq!(batch.evaluated(), 1);
        assert_eq!(batch.mean_precision(), Some(1.0));

        let fitted = model.fit_query(&q(&["a"])).unwrap();
        assert_eq!(
            model.evaluate_query(&fitted, &HashSet::from([0])),
            Err(TermsetError::RelevantOutOfRange { doc_id: 0, num_docs: 4 })
        );
    }

    #[test]
    fn parallel_fit_matches_sequential() {
        let index = index();
        let model = TermsetModel::new(&index, ModelConfig::new(1, WeightingMode::Idf), None).unwrap();
        let queries = vec![q(&["a", "b"]), q(&["b", "c"]), q(&["c"])];
        assert_eq!(model.fit(&queries), model.fit_par(&queries));
    }
}
