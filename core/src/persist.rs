//! JSON inputs and outputs of an evaluation run.
//!
//! An experiment directory holds the externally built index, the query batch,
//! one relevance list per query and, for the `idf-tnw` mode, per-term weights.

use crate::model::BatchResult;
use crate::{DocId, InvertedIndex, Term, TermWeights};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsFile {
    pub created_at: String,
    pub version: u32,
    pub min_freq: usize,
    pub mode: String,
    pub mean_precision: Option<f64>,
    pub mean_recall: Option<f64>,
    #[serde(flatten)]
    pub batch: BatchResult,
}

pub struct ExperimentPaths {
    pub root: PathBuf,
}

impl ExperimentPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("index.json") }
    pub fn queries(&self) -> PathBuf { self.root.join("queries.json") }
    pub fn relevance(&self) -> PathBuf { self.root.join("relevance.json") }
    pub fn term_weights(&self) -> PathBuf { self.root.join("term_weights.json") }
    pub fn results(&self) -> PathBuf { self.root.join("results").join("results.json") }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let json = serde_json::to_string_pretty(value)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    let index: InvertedIndex = read_json(path)?;
    index.validate()?;
    Ok(index)
}

pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    write_json(path, index)
}

pub fn load_queries(path: &Path) -> Result<Vec<Vec<Term>>> {
    read_json(path)
}

pub fn load_relevance(path: &Path) -> Result<Vec<HashSet<DocId>>> {
    let lists: Vec<Vec<DocId>> = read_json(path)?;
    Ok(lists.into_iter().map(|l| l.into_iter().collect()).collect())
}

pub fn load_term_weights(path: &Path) -> Result<TermWeights> {
    read_json(path)
}

pub fn save_results(path: &Path, results: &ResultsFile) -> Result<()> {
    write_json(path, results)
}

pub fn load_results(path: &Path) -> Result<ResultsFile> {
    read_json(path)
}
