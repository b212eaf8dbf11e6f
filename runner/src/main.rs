use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use termset::config::{ModelConfig, DEFAULT_MIN_FREQ};
use termset::miner::mine_with_stats;
use termset::model::TermsetModel;
use termset::persist::{load_index, load_queries, load_relevance, load_term_weights, save_results, ExperimentPaths, ResultsFile};
use termset::vectorizer::WeightingMode;
use termset::Term;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "runner")]
#[command(about = "Rank and evaluate documents with frequent query termsets", long_about = None)]
struct Cli {
    /// Experiment directory holding index.json, queries.json, relevance.json
    /// and optionally term_weights.json
    #[arg(long, global = true, default_value = "./data")]
    data: PathBuf,
    /// Minimum number of documents a termset must occur in
    #[arg(long, global = true, env = "TERMSET_MIN_FREQ", default_value_t = DEFAULT_MIN_FREQ)]
    min_freq: usize,
    /// Weighting mode: idf or idf-tnw
    #[arg(long, global = true, env = "TERMSET_MODE", default_value_t = WeightingMode::Idf)]
    mode: WeightingMode,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit every query and report precision/recall against the relevance sets
    Evaluate {
        /// Process queries on the rayon thread pool
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Results file (defaults to <data>/results/results.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the frequent termsets of a single query
    Mine {
        /// Whitespace separated query terms
        #[arg(long)]
        query: String,
    },
    /// Print the top ranked documents for a single query
    Rank {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let paths = ExperimentPaths::new(&cli.data);
    let config = ModelConfig::new(cli.min_freq, cli.mode);
    config.validate()?;

    match cli.command {
        Commands::Evaluate { parallel, output } => evaluate(&paths, config, parallel, output),
        Commands::Mine { query } => mine_query(&paths, config, &query),
        Commands::Rank { query, top } => rank_query(&paths, config, &query, top),
    }
}

fn split_query(query: &str) -> Vec<Term> {
    query.split_whitespace().map(str::to_string).collect()
}

fn evaluate(paths: &ExperimentPaths, config: ModelConfig, parallel: bool, output: Option<PathBuf>) -> Result<()> {
    let index = load_index(&paths.index())?;
    let queries = load_queries(&paths.queries())?;
    let relevant = load_relevance(&paths.relevance())?;
    if queries.len() != relevant.len() {
        bail!("{} queries but {} relevance lists", queries.len(), relevant.len());
    }
    let weights = match config.mode {
        WeightingMode::IdfTnw => Some(load_term_weights(&paths.term_weights())?),
        WeightingMode::Idf => None,
    };
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), queries = queries.len(), "loaded experiment");

    let model = TermsetModel::new(&index, config, weights.as_ref())?;
    let start = std::time::Instant::now();
    let batch = model.run(&queries, &relevant, parallel)?;
    let elapsed = start.elapsed();

    let mean_precision = batch.mean_precision();
    let mean_recall = batch.mean_recall();
    tracing::info!(
        evaluated = batch.evaluated(),
        skipped = batch.queries.len() - batch.evaluated(),
        took_s = elapsed.as_secs_f64(),
        "evaluation complete"
    );
    println!(
        "mode={} min_freq={} precision={} recall={}",
        config.mode,
        config.min_freq,
        fmt_score(mean_precision),
        fmt_score(mean_recall)
    );

    let results = ResultsFile {
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: 1,
        min_freq: config.min_freq,
        mode: config.mode.to_string(),
        mean_precision,
        mean_recall,
        batch,
    };
    let out = output.unwrap_or_else(|| paths.results());
    save_results(&out, &results)?;
    tracing::info!(output = %out.display(), "results written");
    Ok(())
}

fn mine_query(paths: &ExperimentPaths, config: ModelConfig, query: &str) -> Result<()> {
    let index = load_index(&paths.index())?;
    let (occ, stats) = mine_with_stats(&split_query(query), &index, config.min_freq)?;
    for (termset, docs) in occ.iter() {
        println!("{termset}\t{}", docs.len());
    }
    tracing::info!(
        terms = stats.query_terms,
        levels = stats.levels,
        candidates = stats.candidates,
        pruned = stats.pruned,
        frequent = stats.frequent,
        "mined query"
    );
    Ok(())
}

fn rank_query(paths: &ExperimentPaths, config: ModelConfig, query: &str, top: usize) -> Result<()> {
    let index = load_index(&paths.index())?;
    let weights = match config.mode {
        WeightingMode::IdfTnw => Some(load_term_weights(&paths.term_weights())?),
        WeightingMode::Idf => None,
    };
    let model = TermsetModel::new(&index, config, weights.as_ref())?;
    let ranking = model.fit_query(&split_query(query))?.rank()?;
    for (rank, (doc_id, score)) in ranking.top(top).iter().enumerate() {
        println!("{:>4}  doc {doc_id:<8} {score:.4}", rank + 1);
    }
    Ok(())
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| format!("{s:.3}"))
}
