//! File I/O, validation, and serialization for the grove pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ExperimentName, LabeledDataset};
pub use error::IoError;
pub use reader::DatasetReader;
pub use writer::ReportWriter;
