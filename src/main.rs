use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::ProgressBar;
use tracing::info;

use thatch::cache::{AssignmentCache, CsvCache};
use thatch::cluster::runner::{ClusterRunner, DEFAULT_MIN_CLUSTER_SIZE};
use thatch::cluster::{model_key, ClusterAssignment};
use thatch::config::Config;
use thatch::corpus::{self, sample, Document};
use thatch::manifest::{RunManifest, RunRecord};
use thatch::vectorize::pos::{build_pos_matrix, HeuristicTagger};
use thatch::vectorize::{build_matrix, DocumentNgramMatrix, Measure, NgramParams};

/// Thatch: astroturf detection for FCC docket comments.
///
/// Draws a reproducible sample of public comments, vectorizes it under a
/// chosen n-gram representation, clusters with HDBSCAN, and compares the
/// clusters against the human astroturf labeling.
#[derive(Parser)]
#[command(name = "thatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a seeded sample from the docket export
    Sample {
        /// Sample size
        #[arg(long)]
        n: usize,

        /// Random seed — together with --n this names the run directory
        #[arg(long)]
        seed: u64,
    },

    /// Vectorize a sample and cluster it (cached per model key)
    Cluster {
        /// Sample size of an existing sample
        #[arg(long)]
        n: usize,

        /// Seed of an existing sample
        #[arg(long)]
        seed: u64,

        /// Representation: word or pos
        #[arg(long, default_value = "word")]
        repr: String,

        /// Maximum n-gram order
        #[arg(long, default_value = "2")]
        order: usize,

        /// Minimum n-gram order (defaults to --order)
        #[arg(long)]
        min_order: Option<usize>,

        /// Weighting measure: tf, idf, or tfidf
        #[arg(long, default_value = "tf")]
        measure: String,

        /// Minimum cell weight — cells at or below this are dropped
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// HDBSCAN minimum cluster size
        #[arg(long, default_value_t = DEFAULT_MIN_CLUSTER_SIZE)]
        min_cluster_size: usize,
    },

    /// Compare a cached clustering against the ground-truth labels
    Evaluate {
        /// Sample size of an existing sample
        #[arg(long)]
        n: usize,

        /// Seed of an existing sample
        #[arg(long)]
        seed: u64,

        /// Model key, e.g. word_2_tfidf
        #[arg(long)]
        model: String,
    },

    /// Show sample directories and cached models
    Status,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("thatch=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Sample { n, seed } => {
            config.require_comments()?;
            if n == 0 {
                anyhow::bail!("Sample size must be positive");
            }

            println!("Loading docket export from {}...", config.comments_csv.display());
            let docs = corpus::load_comments(&config.comments_csv)?;

            let sampled = sample::draw(&docs, n, seed)?;
            let dir = config.sample_dir(n, seed);
            let path = sample::save(&dir, &sampled)?;

            println!("Sampled {} of {} comments.", sampled.len(), docs.len());
            println!("Sample written to: {}", path.display());
            println!("\nNext: cargo run -- cluster --n {n} --seed {seed}");
        }

        Commands::Cluster {
            n,
            seed,
            repr,
            order,
            min_order,
            measure,
            threshold,
            min_cluster_size,
        } => {
            if threshold < 0.0 {
                anyhow::bail!("Threshold must be >= 0");
            }
            if min_cluster_size < 2 {
                anyhow::bail!("Minimum cluster size must be at least 2");
            }
            let measure: Measure = measure.parse()?;
            let params = match min_order {
                Some(min) => NgramParams::with_min(order, min)?,
                None => NgramParams::new(order)?,
            };

            let dir = config.sample_dir(n, seed);
            let docs = sample::load(&dir)?;
            println!("Loaded sample of {} comments from {}", docs.len(), dir.display());

            let model = model_key(&repr, order, measure);
            let matrix = build_with_spinner(&docs, &repr, &params, measure, threshold)?;
            println!(
                "Matrix: {} documents × {} grams",
                matrix.n_rows(),
                matrix.n_cols()
            );

            let cache = CsvCache::new(&dir);
            let was_cached = cache.exists(&model);
            let runner = ClusterRunner::with_min_cluster_size(&cache, min_cluster_size);

            let spinner = spinner("Clustering with HDBSCAN...");
            let assignments = runner.run(&matrix, &model);
            spinner.finish_and_clear();
            let assignments = assignments?;

            if was_cached {
                println!(
                    "{}",
                    format!(
                        "Loaded cached clustering for '{model}' — delete {} to recompute.",
                        cache.path(&model).display()
                    )
                    .yellow()
                );
            } else {
                record_run(&dir, &model, &assignments)?;
            }

            thatch::output::terminal::display_cluster_summary(&model, &assignments, &docs);
            println!(
                "\nNext: cargo run -- evaluate --n {n} --seed {seed} --model {model}"
            );
        }

        Commands::Evaluate { n, seed, model } => {
            let dir = config.sample_dir(n, seed);
            let docs = sample::load(&dir)?;

            let cache = CsvCache::new(&dir);
            if !cache.exists(&model) {
                anyhow::bail!(
                    "No cached clustering for model '{}' in {}\n\
                     Run `thatch cluster` with matching parameters first.",
                    model,
                    dir.display()
                );
            }
            let assignments = cache.read(&model)?;

            let report = thatch::eval::evaluate(&model, &assignments, &docs)?;
            thatch::output::terminal::display_eval_report(&report);
        }

        Commands::Status => {
            thatch::status::show(&config)?;
        }
    }

    Ok(())
}

/// Build the feature matrix for the chosen representation, with a spinner —
/// high orders over large samples take a while.
fn build_with_spinner(
    docs: &[Document],
    repr: &str,
    params: &NgramParams,
    measure: Measure,
    threshold: f64,
) -> Result<DocumentNgramMatrix> {
    let pb = spinner("Building document × n-gram matrix...");
    let matrix = match repr {
        "word" => build_matrix(docs, params, measure, threshold),
        "pos" => build_pos_matrix(docs, &HeuristicTagger, params, measure, threshold),
        other => {
            pb.finish_and_clear();
            anyhow::bail!("Unknown representation '{other}' (expected word or pos)");
        }
    };
    pb.finish_and_clear();
    Ok(matrix)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Record a completed clustering in the run manifest.
fn record_run(
    dir: &std::path::Path,
    model: &str,
    assignments: &[ClusterAssignment],
) -> Result<()> {
    let clusters = assignments
        .iter()
        .filter(|a| !a.is_noise())
        .map(|a| a.cluster)
        .collect::<std::collections::HashSet<_>>()
        .len();
    let noise = assignments.iter().filter(|a| a.is_noise()).count();

    let mut manifest = RunManifest::load(dir)?;
    manifest.record(RunRecord {
        model: model.to_string(),
        built_at: chrono::Utc::now(),
        documents: assignments.len(),
        clusters,
        noise,
    });
    manifest.save(dir)?;
    info!(model, clusters, noise, "Recorded run in manifest");
    Ok(())
}
