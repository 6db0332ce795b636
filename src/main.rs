use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use grove_io::{DatasetReader, ExperimentName, ReportWriter};
use grove_rf::{CrossValidation, DecisionTreeConfig, Direction, RandomForestConfig};

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "CART decision trees, bagged random forests, and k-fold cross-validation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Train a random forest and score it on a held-out split
    Evaluate {
        /// Path to the input CSV file (label in the last column)
        #[arg(long)]
        data: PathBuf,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 10)]
        trees: usize,

        /// Fraction of samples held out from training
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Estimate random forest accuracy with k-fold cross-validation
    CrossValidate {
        /// Path to the input CSV file (label in the last column)
        #[arg(long)]
        data: PathBuf,

        /// Number of folds
        #[arg(long, default_value_t = 5)]
        folds: usize,

        /// Number of trees per fold
        #[arg(long, default_value_t = 10)]
        trees: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Train one decision tree on all samples and trace a prediction through it
    Trace {
        /// Path to the input CSV file (label in the last column)
        #[arg(long)]
        data: PathBuf,

        /// Feature values of the sample to classify
        #[arg(long, required = true, value_delimiter = ',', num_args = 1.., allow_negative_numbers = true)]
        sample: Vec<f64>,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    experiment: String,
    n_samples: usize,
    n_features: usize,
    n_trees: usize,
    n_train: usize,
    n_held_out: usize,
    held_out_accuracy: f64,
    accuracy_percent: f64,
}

#[derive(Serialize)]
struct CrossValidateOutput {
    experiment: String,
    n_samples: usize,
    n_folds: usize,
    n_trees: usize,
    fold_accuracies: Vec<f64>,
    mean_accuracy: f64,
    std_accuracy: f64,
}

#[derive(Serialize)]
struct TraceOutput {
    label: usize,
    leaf: usize,
    tree_nodes: usize,
    tree_depth: usize,
    steps: Vec<TraceStep>,
}

#[derive(Serialize)]
struct TraceStep {
    node: usize,
    feature: String,
    threshold: f64,
    value: f64,
    direction: &'static str,
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

    match cli.command {
        Command::Evaluate {
            data,
            trees,
            test_fraction,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read dataset
            let labeled = DatasetReader::new(&data)
                .read()
                .context("failed to read input CSV")?;
            let dataset = labeled.dataset();

            // 2. Train on the training split
            let config = RandomForestConfig::new(trees)?
                .with_seed(cli.seed)
                .with_test_fraction(test_fraction);
            let result = config.train(dataset).context("forest training failed")?;

            // 3. Score the held-out split
            let held_out_accuracy = result
                .evaluate_held_out()
                .context("held-out split is empty; lower --test-fraction or add samples")?;
            let metrics = result
                .forest()
                .evaluate_accuracy(result.held_out())
                .context("held-out evaluation failed")?;
            info!(held_out_accuracy, "forest evaluated");

            // 4. Write evaluation JSON
            let writer = ReportWriter::new(&output_dir, experiment_name)?;
            writer.write_evaluation(result.metadata(), held_out_accuracy, &metrics)?;

            // 5. Print summary
            let metadata = result.metadata();
            let output = EvaluateOutput {
                experiment,
                n_samples: metadata.n_samples,
                n_features: metadata.n_features,
                n_trees: metadata.n_trees,
                n_train: metadata.n_train,
                n_held_out: metadata.n_held_out,
                held_out_accuracy,
                accuracy_percent: metrics.accuracy,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::CrossValidate {
            data,
            folds,
            trees,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            let dataset = DatasetReader::new(&data)
                .read()
                .context("failed to read input CSV")?
                .into_dataset();

            let cv_result = CrossValidation::new(folds)?
                .with_seed(cli.seed)
                .perform(&dataset, trees)
                .context("cross-validation failed")?;

            let writer = ReportWriter::new(&output_dir, experiment_name)?;
            writer.write_cross_validation(trees, &cv_result)?;

            let output = CrossValidateOutput {
                experiment,
                n_samples: cv_result.n_samples,
                n_folds: cv_result.n_folds,
                n_trees: trees,
                fold_accuracies: cv_result.fold_accuracies,
                mean_accuracy: cv_result.mean_accuracy,
                std_accuracy: cv_result.std_accuracy,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Trace { data, sample } => {
            let labeled = DatasetReader::new(&data)
                .read()
                .context("failed to read input CSV")?;

            let tree = DecisionTreeConfig::new()
                .train(labeled.dataset())
                .context("tree training failed")?;
            let path = tree
                .decision_path(&sample)
                .context("sample does not match the dataset's feature count")?;
            info!("decision path:\n{path}");

            let names = labeled.feature_names();
            let steps = path
                .steps
                .iter()
                .map(|step| TraceStep {
                    node: step.node.index(),
                    feature: names[step.feature.index()].clone(),
                    threshold: step.threshold,
                    value: step.value,
                    direction: match step.direction {
                        Direction::Left => "left",
                        Direction::Right => "right",
                    },
                })
                .collect();

            let output = TraceOutput {
                label: path.label,
                leaf: path.leaf.index(),
                tree_nodes: tree.n_nodes(),
                tree_depth: tree.depth(),
                steps,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
