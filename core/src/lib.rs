pub mod config;
pub mod error;
pub mod evaluate;
pub mod index;
pub mod miner;
pub mod model;
pub mod persist;
pub mod scorer;
pub mod termset;
pub mod vectorizer;

pub use error::{Result, TermsetError};
pub use index::{DocId, InvertedIndex, Posting, Term};
pub use termset::{Termset, TermsetOccurrences};

/// Per-term normalized weights consumed by the `idf-tnw` weighting mode.
pub type TermWeights = std::collections::HashMap<Term, f64>;
