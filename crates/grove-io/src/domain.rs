//! Domain types shared by the reader and the writer.

use grove_rf::Dataset;

use crate::IoError;

/// A validated experiment name used to prefix output files.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dataset read from CSV, with the header names of its columns.
///
/// Produced by [`DatasetReader`](crate::DatasetReader).
#[derive(Debug)]
pub struct LabeledDataset {
    feature_names: Vec<String>,
    label_name: String,
    dataset: Dataset,
}

impl LabeledDataset {
    pub(crate) fn new(feature_names: Vec<String>, label_name: String, dataset: Dataset) -> Self {
        Self {
            feature_names,
            label_name,
            dataset,
        }
    }

    /// Return the feature column names, in column order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the header name of the label column.
    #[must_use]
    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    /// Borrow the validated dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Consume and return the validated dataset.
    #[must_use]
    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }
}
