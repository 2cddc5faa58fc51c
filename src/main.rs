use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use paradist_dtw::StepPattern;
use paradist_io::{Dataset, ExperimentName, MatrixReader, ResultWriter, SeriesReader};
use paradist_metric::{MeasureFactory, MetricArgs};

#[derive(Parser)]
#[command(name = "paradist")]
#[command(about = "Parallel pairwise distance matrices with dynamic time warping")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Layout of the input CSV.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    /// `id,v0,v1,...`: one univariate sequence per row
    Wide,
    /// `id,t,f0[,f1,...]`: one time step per row
    Long,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the distances between every pair of input sequences
    Dist {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Layout of the input CSV
        #[arg(long, value_enum, default_value_t = InputFormat::Wide)]
        format: InputFormat,

        /// Distance measure (unknown names fall back to euclidean)
        #[arg(long, default_value = "euclidean")]
        method: String,

        /// Measure argument, e.g. `step.pattern=symmetric2` or `window.size=10` (repeatable)
        #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, String)>,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long, default_value = "paradist")]
        experiment: ExperimentName,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Mark the diagonal as displayed in the artifact
        #[arg(long, default_value_t = false)]
        diag: bool,

        /// Mark the upper triangle as displayed in the artifact
        #[arg(long, default_value_t = false)]
        upper: bool,
    },

    /// List the DTW step patterns
    Patterns,
}

#[derive(Serialize)]
struct DistOutput {
    experiment: String,
    method: String,
    n_sequences: usize,
    n_pairs: usize,
    n_non_finite: usize,
    output: String,
}

#[derive(Serialize)]
struct PatternOutput {
    name: &'static str,
    offset: usize,
    branches: usize,
    symmetric: bool,
    path_reconstruction: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{raw}\""))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn read_dataset(data: &Path, format: InputFormat) -> Result<Dataset> {
    let dataset = match format {
        InputFormat::Wide => MatrixReader::new(data).read(),
        InputFormat::Long => SeriesReader::new(data).read(),
    };
    dataset.context("failed to read input CSV")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Dist {
            data,
            format,
            method,
            args,
            experiment,
            output_dir,
            diag,
            upper,
        } => {
            let metric_args = MetricArgs::from_pairs(args).context("invalid measure argument")?;

            let dataset = read_dataset(&data, format)?;
            info!(n_sequences = dataset.len(), "dataset loaded");

            let measure = MeasureFactory::new(&dataset.series)
                .with_matrix_input(dataset.matrix_input)
                .create(&method, &metric_args)
                .with_context(|| format!("cannot build measure \"{method}\""))?;

            let dist = measure
                .pairwise(&dataset.series)
                .context("pairwise computation failed")?
                .with_labels(dataset.labels())?
                .with_diag(diag)
                .with_upper(upper);

            // Write JSON artifact
            let experiment_label = experiment.to_string();
            let writer = ResultWriter::new(&output_dir, experiment)?;
            let path = writer.write_dist(&dist)?;

            // Build and print stdout summary
            let output = DistOutput {
                experiment: experiment_label,
                method: dist.method().to_string(),
                n_sequences: dist.len(),
                n_pairs: dist.values().len(),
                n_non_finite: dist.values().iter().filter(|d| !d.is_finite()).count(),
                output: path.display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Patterns => {
            let output: Vec<PatternOutput> = StepPattern::ALL
                .into_iter()
                .map(|p| PatternOutput {
                    name: p.name(),
                    offset: p.offset(),
                    branches: p.branches().len(),
                    symmetric: p.is_symmetric(),
                    path_reconstruction: p.supports_backtrace(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
