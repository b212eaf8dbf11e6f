//! Termsets and their document occurrences.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DocId, Term};

/// A duplicate-free set of terms kept in canonical (sorted) order, so equality
/// and hashing depend on membership only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Termset(Vec<Term>);

impl Termset {
    pub fn new<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        let mut terms: Vec<Term> = terms.into_iter().map(Into::into).collect();
        terms.sort_unstable();
        terms.dedup();
        Self(terms)
    }

    pub fn singleton(term: impl Into<Term>) -> Self {
        Self(vec![term.into()])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    pub fn contains(&self, term: &str) -> bool {
        self.0.binary_search_by(|t| t.as_str().cmp(term)).is_ok()
    }

    pub fn is_subset_of(&self, other: &Termset) -> bool {
        self.0.iter().all(|t| other.contains(t))
    }

    /// All subsets with exactly one term removed.
    pub fn subsets_one_smaller(&self) -> Vec<Termset> {
        (0..self.0.len())
            .map(|skip| {
                Termset(
                    self.0
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != skip)
                        .map(|(_, t)| t.clone())
                        .collect(),
                )
            })
            .collect()
    }

    /// Apriori prefix join: two k-sets sharing their first k-1 terms give the
    /// (k+1)-set of their union. `None` when the prefixes differ or `other`
    /// does not sort after `self`.
    pub(crate) fn join(&self, other: &Termset) -> Option<Termset> {
        let k = self.0.len();
        if k == 0 || k != other.0.len() || self.0[..k - 1] != other.0[..k - 1] {
            return None;
        }
        if self.0[k - 1] >= other.0[k - 1] {
            return None;
        }
        let mut terms = self.0.clone();
        terms.push(other.0[k - 1].clone());
        Some(Termset(terms))
    }
}

impl fmt::Display for Termset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(", "))
    }
}

/// Frequent termsets paired with the sorted ids of the documents containing
/// every one of their terms.
///
/// The entry order is the row order of every vector and matrix built from
/// this collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermsetOccurrences {
    entries: Vec<(Termset, Vec<DocId>)>,
}

impl TermsetOccurrences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, termset: Termset, docs: Vec<DocId>) {
        self.entries.push((termset, docs));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Termset, &[DocId])> {
        self.entries.iter().map(|(ts, docs)| (ts, docs.as_slice()))
    }

    pub fn termsets(&self) -> impl Iterator<Item = &Termset> {
        self.entries.iter().map(|(ts, _)| ts)
    }

    pub fn docs(&self, row: usize) -> Option<&[DocId]> {
        self.entries.get(row).map(|(_, docs)| docs.as_slice())
    }

    pub fn get(&self, termset: &Termset) -> Option<&[DocId]> {
        self.entries
            .iter()
            .find(|(ts, _)| ts == termset)
            .map(|(_, docs)| docs.as_slice())
    }

    /// Entries whose termsets have exactly `k` terms.
    pub fn by_level(&self, k: usize) -> impl Iterator<Item = (&Termset, &[DocId])> {
        self.iter().filter(move |(ts, _)| ts.len() == k)
    }

    pub fn max_level(&self) -> usize {
        self.entries.iter().map(|(ts, _)| ts.len()).max().unwrap_or(0)
    }
}
