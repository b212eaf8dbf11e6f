//! Termset-weighted query and document vectors.
//!
//! Rows of every vector and matrix built here follow the entry order of the
//! `TermsetOccurrences` they came from; columns are documents `1..=N`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::round_score;
use crate::error::{Result, TermsetError};
use crate::{InvertedIndex, TermWeights, TermsetOccurrences};

/// Dense row-major matrix of termsets x documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in &rows {
            if row.len() != cols {
                return Err(TermsetError::DimensionMismatch {
                    what: "matrix row",
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: rows.len(), cols, data })
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.cols).map(move |c| self.column(c))
    }
}

/// How document rows are scaled before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingMode {
    /// termset idf only
    #[default]
    Idf,
    /// termset idf times the termset-normalized weight
    IdfTnw,
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightingMode::Idf => f.write_str("idf"),
            WeightingMode::IdfTnw => f.write_str("idf-tnw"),
        }
    }
}

impl FromStr for WeightingMode {
    type Err = TermsetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idf" => Ok(WeightingMode::Idf),
            "idf-tnw" | "idf_tnw" | "tnw" => Ok(WeightingMode::IdfTnw),
            other => Err(TermsetError::UnknownWeightingMode(other.to_string())),
        }
    }
}

/// Termset idf: `log2(1 + N / |docs|)` per termset, in entry order.
/// A termset with no documents weighs 0.
pub fn query_vector(termsets: &TermsetOccurrences, num_docs: u32) -> Vec<f64> {
    let n = f64::from(num_docs);
    termsets
        .iter()
        .map(|(_, docs)| {
            if docs.is_empty() {
                return 0.0;
            }
            round_score((1.0 + n / docs.len() as f64).log2())
        })
        .collect()
}

/// Termset frequency matrix (|termsets| x N).
///
/// A termset's raw frequency in a document is the smallest frequency of any
/// of its terms there; the cell holds `1 + log2(min_tf)`. Documents outside
/// the termset's occurrence list stay 0.
pub fn document_matrix(
    termsets: &TermsetOccurrences,
    index: &InvertedIndex,
    num_docs: u32,
) -> Result<Matrix> {
    let mut tsf = Matrix::zeros(termsets.len(), num_docs as usize);

    for (row, (termset, docs)) in termsets.iter().enumerate() {
        // min tf per document of `docs`, aligned by position
        let mut min_tf: Vec<Option<u32>> = vec![None; docs.len()];
        for term in termset.terms() {
            for posting in index.postings(term).unwrap_or_default() {
                if let Ok(pos) = docs.binary_search(&posting.doc_id) {
                    let slot = &mut min_tf[pos];
                    *slot = Some(slot.map_or(posting.tf, |tf| tf.min(posting.tf)));
                }
            }
        }

        for (&doc_id, tf) in docs.iter().zip(min_tf) {
            let Some(tf) = tf else { continue };
            if doc_id == 0 || doc_id > num_docs {
                return Err(TermsetError::DocumentOutOfRange { doc_id, num_docs });
            }
            tsf.set(row, doc_id as usize - 1, round_score(1.0 + f64::from(tf).log2()));
        }
    }
    Ok(tsf)
}

/// Termset-normalized weight: product of the per-term weights of each
/// termset's terms. Terms without a weight count as 1; any zero-weight term
/// zeroes the whole termset.
pub fn tnw(termsets: &TermsetOccurrences, weights: &TermWeights) -> Vec<f64> {
    termsets
        .termsets()
        .map(|ts| {
            let product = ts
                .terms()
                .iter()
                .filter_map(|t| weights.get(t))
                .product::<f64>();
            round_score(product)
        })
        .collect()
}

/// Scale each row of `tsf` by its idf (times tnw when given).
///
/// Only lengths are checked: `idf`, `tnw` and `tsf` must all have been built
/// from the same `TermsetOccurrences`, which is what fixes their row order.
pub fn document_vectors(tsf: &Matrix, idf: &[f64], tnw: Option<&[f64]>) -> Result<Matrix> {
    if idf.len() != tsf.rows() {
        return Err(TermsetError::DimensionMismatch {
            what: "idf vector",
            expected: tsf.rows(),
            found: idf.len(),
        });
    }
    if let Some(tnw) = tnw {
        if tnw.len() != tsf.rows() {
            return Err(TermsetError::DimensionMismatch {
                what: "tnw vector",
                expected: tsf.rows(),
                found: tnw.len(),
            });
        }
    }

    let mut out = Matrix::zeros(tsf.rows(), tsf.cols());
    for row in 0..tsf.rows() {
        let scale = idf[row] * tnw.map_or(1.0, |w| w[row]);
        for col in 0..tsf.cols() {
            out.set(row, col, round_score(tsf.get(row, col) * scale));
        }
    }
    Ok(out)
}

/// Everything the scorer needs for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryVectors {
    pub idf: Vec<f64>,
    pub tsf: Matrix,
    /// present only in `IdfTnw` mode
    pub tnw: Option<Vec<f64>>,
}

impl QueryVectors {
    pub fn document_vectors(&self) -> Result<Matrix> {
        document_vectors(&self.tsf, &self.idf, self.tnw.as_deref())
    }
}

/// Vectorizes mined termsets according to one weighting mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vectorizer {
    mode: WeightingMode,
}

impl Vectorizer {
    pub fn new(mode: WeightingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> WeightingMode {
        self.mode
    }

    pub fn vectorize(
        &self,
        termsets: &TermsetOccurrences,
        index: &InvertedIndex,
        weights: Option<&TermWeights>,
    ) -> Result<QueryVectors> {
        let n = index.num_docs();
        let idf = query_vector(termsets, n);
        let tsf = document_matrix(termsets, index, n)?;
        let tnw = match self.mode {
            WeightingMode::Idf => None,
            WeightingMode::IdfTnw => {
                let weights = weights.ok_or(TermsetError::MissingTermWeights)?;
                Some(tnw(termsets, weights))
            }
        };
        Ok(QueryVectors { idf, tsf, tnw })
    }
}
