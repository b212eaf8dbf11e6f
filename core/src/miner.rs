//! Levelwise Apriori mining of frequent query termsets over an inverted index.

use std::collections::HashSet;
use tracing::{debug, trace};

use crate::error::{Result, TermsetError};
use crate::{DocId, InvertedIndex, Term, Termset, TermsetOccurrences};

/// Counters gathered while mining one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiningStats {
    /// query terms kept after dropping unknown and duplicate terms
    pub query_terms: usize,
    /// levels that produced at least one frequent termset
    pub levels: usize,
    pub candidates: usize,
    /// candidates discarded because a subset was infrequent
    pub pruned: usize,
    pub frequent: usize,
}

/// Mine every termset of the query's terms occurring in at least `min_freq`
/// documents.
///
/// Unknown and repeated query terms are dropped. Entries come out level by
/// level, lexicographically ordered within a level.
pub fn mine(query: &[Term], index: &InvertedIndex, min_freq: usize) -> Result<TermsetOccurrences> {
    mine_with_stats(query, index, min_freq).map(|(occ, _)| occ)
}

pub fn mine_with_stats(
    query: &[Term],
    index: &InvertedIndex,
    min_freq: usize,
) -> Result<(TermsetOccurrences, MiningStats)> {
    if min_freq == 0 {
        return Err(TermsetError::InvalidMinFrequency);
    }

    let terms = known_terms(query, index);
    if terms.is_empty() {
        return Err(TermsetError::InvalidQuery);
    }

    let mut stats = MiningStats { query_terms: terms.len(), ..MiningStats::default() };
    let mut out = TermsetOccurrences::new();

    // level 1
    let mut level: Vec<(Termset, Vec<DocId>)> = terms
        .iter()
        .map(|t| (Termset::singleton(t.as_str()), index.doc_ids(t)))
        .collect();
    stats.candidates += level.len();
    level.retain(|(_, docs)| docs.len() >= min_freq);
    level.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(level = 1, candidates = terms.len(), frequent = level.len(), "apriori level");

    let mut k = 1;
    while !level.is_empty() {
        stats.levels += 1;
        stats.frequent += level.len();
        let next = next_level(&level, min_freq, &mut stats);
        debug!(level = k + 1, frequent = next.len(), "apriori level");
        for (termset, docs) in level {
            out.push(termset, docs);
        }
        level = next;
        k += 1;
    }

    Ok((out, stats))
}

/// Distinct query terms present in the index, in first-seen order.
fn known_terms<'q>(query: &'q [Term], index: &InvertedIndex) -> Vec<&'q Term> {
    let mut seen = HashSet::new();
    query
        .iter()
        .filter(|t| {
            if !index.contains_term(t) {
                debug!(term = %t, "dropping query term absent from index");
                return false;
            }
            seen.insert(t.as_str())
        })
        .collect()
}

/// Join frequent k-termsets (sorted) into frequent (k+1)-termsets.
fn next_level(
    level: &[(Termset, Vec<DocId>)],
    min_freq: usize,
    stats: &mut MiningStats,
) -> Vec<(Termset, Vec<DocId>)> {
    if level.len() < 2 {
        return Vec::new();
    }
    let frequent: HashSet<&Termset> = level.iter().map(|(ts, _)| ts).collect();
    let mut next = Vec::new();

    for (i, (left, left_docs)) in level.iter().enumerate() {
        for (right, right_docs) in &level[i + 1..] {
            // sorted order: once prefixes diverge no later entry can join
            let Some(candidate) = left.join(right) else {
                break;
            };
            stats.candidates += 1;

            if !candidate.subsets_one_smaller().iter().all(|s| frequent.contains(s)) {
                stats.pruned += 1;
                trace!(termset = %candidate, "pruned: infrequent subset");
                continue;
            }

            let docs = intersect_sorted(left_docs, right_docs);
            if docs.len() >= min_freq {
                next.push((candidate, docs));
            }
        }
    }
    next
}

/// Intersection of two ascending, duplicate-free id lists.
pub fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
