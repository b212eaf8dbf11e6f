use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, TermsetError};

pub type Term = String;
/// Document ids are 1-indexed: column `d - 1` of a document matrix holds document `d`.
pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// raw term frequency, always > 0
    pub tf: u32,
}

impl Posting {
    pub const fn new(doc_id: DocId, tf: u32) -> Self {
        Self { doc_id, tf }
    }
}

/// Read-only term -> posting list mapping built by an external indexer.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub postings: HashMap<Term, Vec<Posting>>, // postings in insertion order
    pub num_docs: u32,
}

impl InvertedIndex {
    pub fn new(num_docs: u32) -> Self {
        Self { postings: HashMap::new(), num_docs }
    }

    pub fn insert(&mut self, term: impl Into<Term>, postings: Vec<Posting>) {
        self.postings.insert(term.into(), postings);
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Sorted, deduplicated ids of the documents containing `term`.
    pub fn doc_ids(&self, term: &str) -> Vec<DocId> {
        let mut ids: Vec<DocId> = self
            .postings(term)
            .map(|plist| plist.iter().map(|p| p.doc_id).collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn term_frequency(&self, term: &str, doc_id: DocId) -> Option<u32> {
        self.postings(term)?
            .iter()
            .find(|p| p.doc_id == doc_id)
            .map(|p| p.tf)
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Check the invariants the pipeline relies on: doc ids in `1..=num_docs`,
    /// positive frequencies, no document listed twice for one term.
    pub fn validate(&self) -> Result<()> {
        for (term, plist) in &self.postings {
            let mut seen = HashSet::with_capacity(plist.len());
            for p in plist {
                if p.doc_id == 0 || p.doc_id > self.num_docs {
                    return Err(TermsetError::InvalidIndex(format!(
                        "term '{term}' references document {} outside 1..={}",
                        p.doc_id, self.num_docs
                    )));
                }
                if p.tf == 0 {
                    return Err(TermsetError::InvalidIndex(format!(
                        "term '{term}' has zero frequency in document {}",
                        p.doc_id
                    )));
                }
                if !seen.insert(p.doc_id) {
                    return Err(TermsetError::InvalidIndex(format!(
                        "term '{term}' lists document {} twice",
                        p.doc_id
                    )));
                }
            }
        }
        Ok(())
    }
}
