use crate::DocId;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TermsetError {
    #[error("query has no terms present in the index")]
    InvalidQuery,

    #[error("relevance set is empty")]
    NoRelevantDocuments,

    #[error("relevant document {doc_id} outside collection of {num_docs} documents")]
    RelevantOutOfRange { doc_id: DocId, num_docs: u32 },

    #[error("none of the {relevant} relevant documents appear in the ranking")]
    NoRelevantRetrieved { relevant: usize },

    #[error("{what}: expected length {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("minimum frequency must be at least 1")]
    InvalidMinFrequency,

    #[error("invalid index: {0}")]
    InvalidIndex(String),

    #[error("document {doc_id} outside collection of {num_docs} documents")]
    DocumentOutOfRange { doc_id: DocId, num_docs: u32 },

    #[error("weighting mode idf-tnw requires per-term weights")]
    MissingTermWeights,

    #[error("unknown weighting mode '{0}' (expected 'idf' or 'idf-tnw')")]
    UnknownWeightingMode(String),
}

pub type Result<T> = core::result::Result<T, TermsetError>;
