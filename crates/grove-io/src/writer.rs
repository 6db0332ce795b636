//! JSON report writer for evaluation and cross-validation outputs.

use std::fs;
use std::path::{Path, PathBuf};

use grove_rf::{AccuracyMetrics, CrossValidationResult, TrainingMetadata};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes evaluation and cross-validation reports to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_evaluate.json` and
/// `{experiment}_cv.json`.
pub struct ReportWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ReportWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a held-out evaluation report to `{experiment}_evaluate.json`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        metadata: &TrainingMetadata,
        held_out_accuracy: f64,
        metrics: &AccuracyMetrics,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("evaluate");
        let artifact = EvaluateArtifact {
            experiment: self.experiment.as_str(),
            n_trees: metadata.n_trees,
            n_samples: metadata.n_samples,
            n_train: metadata.n_train,
            n_held_out: metadata.n_held_out,
            n_features: metadata.n_features,
            held_out_accuracy,
            confusion: metrics,
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "evaluation report written");
        Ok(path)
    }

    /// Write a cross-validation report to `{experiment}_cv.json`.
    ///
    /// Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_cross_validation(
        &self,
        n_trees: usize,
        result: &CrossValidationResult,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("cv");
        let artifact = CrossValidationArtifact {
            experiment: self.experiment.as_str(),
            n_trees,
            result,
        };
        write_json(&path, &artifact)?;
        info!(path = %path.display(), "cross-validation report written");
        Ok(path)
    }

    fn artifact_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }
}

fn write_json(path: &Path, artifact: &impl Serialize) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    experiment: &'a str,
    n_trees: usize,
    n_samples: usize,
    n_train: usize,
    n_held_out: usize,
    n_features: usize,
    held_out_accuracy: f64,
    confusion: &'a AccuracyMetrics,
}

#[derive(Serialize)]
struct CrossValidationArtifact<'a> {
    experiment: &'a str,
    n_trees: usize,
    #[serde(flatten)]
    result: &'a CrossValidationResult,
}
