use std::collections::HashSet;

use termset::config::ModelConfig;
use termset::evaluate::{precision_recall, recall_points};
use termset::miner::mine;
use termset::model::TermsetModel;
use termset::scorer::{rank_documents, Ranking};
use termset::vectorizer::{document_matrix, document_vectors, query_vector, tnw, WeightingMode};
use termset::{InvertedIndex, Posting, Term, TermWeights, Termset, TermsetError};

fn ab_index() -> InvertedIndex {
    let mut index = InvertedIndex::new(2);
    index.insert("a", vec![Posting::new(1, 2), Posting::new(2, 1)]);
    index.insert("b", vec![Posting::new(1, 1), Posting::new(2, 3)]);
    index
}

fn q(ts: &[&str]) -> Vec<Term> {
    ts.iter().map(|t| t.to_string()).collect()
}

#[test]
fn scenario_a_all_three_termsets_frequent() {
    let occ = mine(&q(&["a", "b"]), &ab_index(), 2).unwrap();
    assert_eq!(occ.len(), 3);
    assert_eq!(occ.get(&Termset::singleton("a")), Some(&[1, 2][..]));
    assert_eq!(occ.get(&Termset::singleton("b")), Some(&[1, 2][..]));
    assert_eq!(occ.get(&Termset::new(["a", "b"])), Some(&[1, 2][..]));
}

#[test]
fn scenario_b_min_freq_above_collection_size() {
    let occ = mine(&q(&["a", "b"]), &ab_index(), 3).unwrap();
    assert!(occ.is_empty());
}

#[test]
fn scenario_c_unknown_term_dropped() {
    let with_unknown = mine(&q(&["a", "z"]), &ab_index(), 1).unwrap();
    let without = mine(&q(&["a"]), &ab_index(), 1).unwrap();
    assert_eq!(with_unknown, without);
    assert_eq!(with_unknown.len(), 1);
}

#[test]
fn scenario_d_empty_relevance_set() {
    let err = precision_recall([2, 1], &HashSet::new()).unwrap_err();
    assert_eq!(err, TermsetError::NoRelevantDocuments);
}

#[test]
fn scenario_e_single_relevant_at_top() {
    let ranking = Ranking::from_scores(vec![(1, 0.3), (2, 0.8)]);
    let relevant = HashSet::from([2]);
    assert_eq!(recall_points(ranking.doc_ids(), &relevant).unwrap(), vec![(1.0, 1.0)]);
    let pr = precision_recall(ranking.doc_ids(), &relevant).unwrap();
    assert_eq!((pr.precision, pr.recall), (1.0, 1.0));
}

#[test]
fn empty_mining_result_still_ranks_everything() {
    let index = ab_index();
    let occ = mine(&q(&["a", "b"]), &index, 3).unwrap();
    let idf = query_vector(&occ, 2);
    let tsf = document_matrix(&occ, &index, 2).unwrap();
    assert_eq!((tsf.rows(), tsf.cols()), (0, 2));
    let docs = document_vectors(&tsf, &idf, None).unwrap();
    let ranking = rank_documents(&idf, &docs).unwrap();
    assert_eq!(ranking.iter().copied().collect::<Vec<_>>(), vec![(1, 0.0), (2, 0.0)]);
}

#[test]
fn end_to_end_pipeline_on_scenario_a() {
    let index = ab_index();
    let occ = mine(&q(&["a", "b"]), &index, 2).unwrap();

    // every termset occurs in both documents: log2(1 + 2/2) = 1
    let idf = query_vector(&occ, 2);
    assert_eq!(idf, vec![1.0, 1.0, 1.0]);

    let tsf = document_matrix(&occ, &index, 2).unwrap();
    assert_eq!(tsf.row(0), &[2.0, 1.0]); // {a}
    assert_eq!(tsf.row(1), &[1.0, 2.585]); // {b}
    assert_eq!(tsf.row(2), &[1.0, 1.0]); // {a, b}: min tf is 1 in both

    let docs = document_vectors(&tsf, &idf, None).unwrap();
    let ranking = rank_documents(&idf, &docs).unwrap();
    assert_eq!(ranking.len(), 2);
    // doc 1 = [2, 1, 1]: 4 / (sqrt(3) * sqrt(6))
    // doc 2 = [1, 2.585, 1]: 4.585 / (sqrt(3) * sqrt(8.682225))
    assert_eq!(ranking.doc_ids().collect::<Vec<_>>(), vec![1, 2]);
    let doc1 = ranking.score(1).unwrap();
    let doc2 = ranking.score(2).unwrap();
    assert!((doc1 - 4.0 / 18f64.sqrt()).abs() < 1e-9);
    assert!((doc2 - 4.585 / (3.0 * 8.682225f64).sqrt()).abs() < 1e-9);
    assert!((doc1 - 0.943).abs() < 1e-3 && (doc2 - 0.898).abs() < 1e-3);
}

#[test]
fn idf_tnw_mode_zero_weight_term_removes_its_termsets() {
    let index = ab_index();
    let mut weights = TermWeights::new();
    weights.insert("b".into(), 0.0);
    let model = TermsetModel::new(&index, ModelConfig::new(2, WeightingMode::IdfTnw), Some(&weights)).unwrap();
    let fitted = model.fit_query(&q(&["a", "b"])).unwrap();
    assert_eq!(fitted.vectors.tnw.as_deref(), Some(&[1.0, 0.0, 0.0][..]));
    let docs = fitted.document_vectors().unwrap();
    assert!(docs.row(1).iter().chain(docs.row(2)).all(|x| *x == 0.0));
    assert_eq!(tnw(&fitted.termsets, &weights), vec![1.0, 0.0, 0.0]);
}

#[test]
fn batch_run_reports_in_query_order() {
    let mut index = InvertedIndex::new(3);
    index.insert("x", vec![Posting::new(1, 4), Posting::new(2, 1)]);
    index.insert("y", vec![Posting::new(1, 1), Posting::new(3, 2)]);
    let model = TermsetModel::new(&index, ModelConfig::new(1, WeightingMode::Idf), None).unwrap();

    let queries = vec![q(&["x"]), q(&["nothing"]), q(&["y", "x"])];
    let relevant = vec![HashSet::from([1, 2]), HashSet::from([1]), HashSet::from([1])];
    let batch = model.run(&queries, &relevant, true).unwrap();

    let ids: Vec<usize> = batch.queries.iter().map(|r| r.query).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    // x: docs 1 and 2 score positive, doc 3 zero -> both relevant at top
    assert_eq!(batch.queries[0].recall, Some(0.75));
    assert_eq!(batch.queries[0].precision, Some(1.0));
    assert_eq!(batch.queries[1].precision, None);
    assert_eq!(batch.evaluated(), 2);
}
